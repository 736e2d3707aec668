// ABOUTME: Re-exports command modules for eqa-notify
// ABOUTME: One module per subcommand
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod dismiss;
pub mod list;
pub mod logout;
pub mod watch;
