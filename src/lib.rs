// MyPC Gateway - Library Root
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// All modules exported here for use by the binary and tests.

pub mod config;
pub mod download;
pub mod encoding;
pub mod gate;
pub mod mcp;
pub mod paths;
pub mod router;
pub mod tools;
pub mod zones;
