pub mod absence;
pub mod calculation;
pub mod employee;
pub mod organization;
pub mod plan;
pub mod shift;
