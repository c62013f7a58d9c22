//! In-crate test harness shared by unit and behaviour tests.

pub(crate) mod support;
