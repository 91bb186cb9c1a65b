/*
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Ingestion formats accepted by the engine (spec.md §6): the structured
//! CSV file format and the free-form manual-entry format.

pub mod csv;
pub mod manual;
