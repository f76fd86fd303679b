#![allow(dead_code)]

pub mod gradecast_env;
pub mod students;
