pub mod salary;
pub mod text;
