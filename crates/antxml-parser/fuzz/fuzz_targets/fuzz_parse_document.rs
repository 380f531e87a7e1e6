// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for whole-document parsing
//!
//! Feeds arbitrary bytes to `AntXmlParser::parse` as UTF-8 and as
//! windows-1252. Any input must end in suites or an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

use antxml_parser::AntXmlParser;

fuzz_target!(|data: &[u8]| {
    let parser = AntXmlParser::new();
    let _ = parser.parse(data, encoding_rs::UTF_8);

    if let Ok(suites) = parser.parse(data, encoding_rs::WINDOWS_1252) {
        // Every parsed trace must still reproduce its body
        for suite in &suites {
            for case in &suite.test_cases {
                for trace in case.stack_traces() {
                    assert_eq!(trace.reconstruct(), trace.content);
                }
            }
        }
    }
});
