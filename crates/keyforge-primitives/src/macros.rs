#[macro_export]
macro_rules! property_type_registry_entries {
    ($macro:ident $(, @args $($args:tt)+ )?) => {
        $macro! {
            $(
                @args $($args)+;
            )?
            @entries
            (
                Boolean,
                id = 0,
                name = "BOOLEAN",
                fixed_size = Some(1)
            ),
            (
                Integer,
                id = 1,
                name = "INTEGER",
                fixed_size = Some(4)
            ),
            (
                Short,
                id = 2,
                name = "SHORT",
                fixed_size = Some(2)
            ),
            (
                Long,
                id = 3,
                name = "LONG",
                fixed_size = Some(8)
            ),
            (
                Float,
                id = 4,
                name = "FLOAT",
                fixed_size = Some(4)
            ),
            (
                Double,
                id = 5,
                name = "DOUBLE",
                fixed_size = Some(8)
            ),
            (
                DateTime,
                id = 6,
                name = "DATETIME",
                fixed_size = Some(8)
            ),
            (
                String,
                id = 7,
                name = "STRING",
                fixed_size = None
            ),
            (
                Binary,
                id = 8,
                name = "BINARY",
                fixed_size = None
            ),
            (
                Link,
                id = 13,
                name = "LINK",
                fixed_size = None
            ),
            (
                Byte,
                id = 17,
                name = "BYTE",
                fixed_size = Some(1)
            ),
            (
                Date,
                id = 19,
                name = "DATE",
                fixed_size = Some(8)
            ),
            (
                Decimal,
                id = 21,
                name = "DECIMAL",
                fixed_size = None
            ),
        }
    };
}

#[macro_export]
macro_rules! property_type_registry {
    ($macro:ident) => {
        $crate::property_type_registry_entries!($macro)
    };
    ($macro:ident, $($args:tt)+) => {
        $crate::property_type_registry_entries!($macro, @args $($args)+)
    };
}

macro_rules! metadata_from_registry {
    ( @args $ty:expr; @entries $( ($variant:ident, id = $id:expr, name = $name:expr, fixed_size = $fixed:expr) ),* $(,)? ) => {
        match $ty {
            $(
                $crate::PropertyType::$variant => $crate::PropertyMetadata {
                    id: $id,
                    name: $name,
                    fixed_size: $fixed,
                },
            )*
        }
    };
}

macro_rules! from_id_from_registry {
    ( @args $id:expr; @entries $( ($variant:ident, id = $vid:expr, name = $name:expr, fixed_size = $fixed:expr) ),* $(,)? ) => {
        match $id {
            $( $vid => Some($crate::PropertyType::$variant), )*
            _ => None,
        }
    };
}

macro_rules! all_types_from_registry {
    ( @entries $( ($variant:ident, id = $id:expr, name = $name:expr, fixed_size = $fixed:expr) ),* $(,)? ) => {
        [ $( $crate::PropertyType::$variant ),* ]
    };
}
