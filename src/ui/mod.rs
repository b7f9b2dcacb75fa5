//! UI module - reusable rendering pieces shared by the pages

pub mod components;
