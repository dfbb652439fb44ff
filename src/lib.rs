pub mod action;
pub mod ast;
pub mod codegen;
pub mod error;
pub mod lower;
pub mod modules;
pub mod scope;
pub mod value;
pub mod value_type;
