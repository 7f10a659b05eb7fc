//! Computations over stored reports that screens and commands display: monthly totals and
//! progress against the monthly goal.

pub mod goal;
pub mod monthly;
