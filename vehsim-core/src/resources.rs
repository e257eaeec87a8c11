#![cfg(feature = "resources")]

use crate::imports::*;
use crate::vehicle::VehicleSpec;
use include_dir::{include_dir, Dir};

pub const RESOURCES_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/resources");

/// List the available resources in the resources directory
/// - subdir: &str, a subdirectory to choose from the resources directory
///   if it cannot be resolved, then the top level is used to list resources
/// NOTE: if you want the top level, a good way to get that is to pass "".
/// RETURNS: a vector of strings for resources that can be loaded
pub fn list_resources(subdir: &str) -> Vec<String> {
    let resources_path = if let Some(rp) = RESOURCES_DIR.get_dir(subdir) {
        rp
    } else {
        &RESOURCES_DIR
    };
    let mut file_names: Vec<String> = resources_path
        .files()
        .filter_map(|entry| entry.path().file_name()?.to_str().map(String::from))
        .collect();
    file_names.sort();
    file_names
}

/// Every bundled sample vehicle, in file name order
pub fn sample_vehicles() -> anyhow::Result<Vec<VehicleSpec>> {
    list_resources("vehicles")
        .iter()
        .map(|file_name| {
            VehicleSpec::from_resource(Path::new("vehicles").join(file_name))
                .with_context(|| format!("loading bundled vehicle {file_name:?}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::CalcParams;
    use crate::vehicle::VehicleKind;

    #[test]
    fn test_list_resources() {
        let result = list_resources("vehicles");
        assert_eq!(result.len(), 5);
        assert_eq!(result[0], "ev_hatchback.yaml");
    }

    #[test]
    fn test_sample_vehicles_cover_every_kind() {
        let vehicles = sample_vehicles().unwrap();
        for kind in VehicleKind::all() {
            assert!(vehicles.iter().any(|veh| veh.kind() == kind), "{kind}");
        }
    }

    #[test]
    fn test_default_params_file_matches_defaults() {
        let params = CalcParams::from_resource("params/default.yaml").unwrap();
        assert_eq!(params, CalcParams::default());
    }
}
