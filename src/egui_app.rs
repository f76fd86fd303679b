//! Desktop front end: the prediction form, model summary and result cards.

pub mod controller;
pub mod style;
pub mod ui;
pub mod view_model;
