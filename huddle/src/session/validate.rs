/// Reason a record can not be written, naming the first offending field
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ValidationError {
    #[display("{table} {key} already exists")]
    DuplicateKey { table: &'static str, key: String },
    #[display("{label} is required")]
    Required {
        field: &'static str,
        label: &'static str,
    },
    #[display("{label} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        label: &'static str,
        min: i64,
        max: i64,
    },
    #[display("{label} must be a number")]
    NotANumber {
        field: &'static str,
        label: &'static str,
    },
}
