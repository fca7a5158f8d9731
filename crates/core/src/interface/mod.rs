// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

pub mod catalog;
pub mod id;
pub mod query;
