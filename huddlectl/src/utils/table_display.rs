use huddle::table::Value;

macro_rules! push_record {
    ( $builder:ident, $($col:expr),* $(,)? ) => {
        {
            use crate::utils::table_display::ColumnDisplay;
            $builder.push_record([$(ColumnDisplay::to_column(&$col),)*])
        }
    }
}

pub trait ColumnDisplay {
    fn to_column(&self) -> String;
}

impl ColumnDisplay for Value {
    fn to_column(&self) -> String {
        self.to_string()
    }
}

impl<T: ColumnDisplay> ColumnDisplay for Option<T> {
    fn to_column(&self) -> String {
        self.as_ref().map(T::to_column).unwrap_or_default()
    }
}

impl ColumnDisplay for String {
    fn to_column(&self) -> String {
        self.clone()
    }
}

impl ColumnDisplay for &str {
    fn to_column(&self) -> String {
        self.to_string()
    }
}

impl ColumnDisplay for i64 {
    fn to_column(&self) -> String {
        self.to_string()
    }
}

impl ColumnDisplay for usize {
    fn to_column(&self) -> String {
        self.to_string()
    }
}

impl ColumnDisplay for bool {
    fn to_column(&self) -> String {
        if *self { "yes" } else { "no" }.to_owned()
    }
}
