//! Type mapping between abstract column types and SQL Anywhere declarations.
//!
//! # Usage
//!
//! ```rust
//! use sqlany_dialect::core::AbstractType;
//! use sqlany_dialect::dialect::{abstract_to_physical, physical_to_abstract};
//!
//! assert_eq!(abstract_to_physical(AbstractType::String), "nvarchar(255)");
//! assert_eq!(physical_to_abstract("long nvarchar"), AbstractType::Text);
//! ```

mod typemap;

pub use typemap::{
    abstract_to_physical, column_type, physical_to_abstract, PhysicalType, TypeMap,
    PHYSICAL_TO_ABSTRACT,
};
