pub mod field_names;
