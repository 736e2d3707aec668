// ABOUTME: Re-exports helper modules for eqa-notify
// ABOUTME: Session setup and output printing shared by the subcommands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod display;
pub mod session;
