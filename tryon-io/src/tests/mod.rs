//! Test modules for tryon-io
//!
//! Loader tests over small glTF documents built in memory.
