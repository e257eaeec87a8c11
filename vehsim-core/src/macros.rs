#[macro_export]
/// Generates a String similar to output of `dbg` but without printing
macro_rules! format_dbg {
    ($dbg_expr:expr) => {
        format!(
            "[{}:{}] {}: {:?}",
            file!(),
            line!(),
            stringify!($dbg_expr),
            $dbg_expr
        )
    };
    () => {
        format!("[{}:{}]", file!(), line!())
    };
}

/// Sums the listed `f64` fields of every item and divides by the item count.
/// `$items` must be a non-empty slice of references.
macro_rules! mean_fields {
    ($items:expr, $ty:ident { $($field:ident),+ $(,)? }) => {{
        let n = $items.len() as f64;
        $ty {
            $($field: $items.iter().map(|item| item.$field).sum::<f64>() / n,)+
            ..$items[0].clone()
        }
    }};
}
