// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for stack trace decomposition

#![no_main]

use libfuzzer_sys::fuzz_target;

use antxml_parser::{StackContent, decompose};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let segments = decompose(input);

        let rebuilt: String = segments.iter().map(StackContent::text).collect();
        assert_eq!(rebuilt, input);

        for segment in &segments {
            if let StackContent::CodeReference(reference) = segment {
                assert!(reference.line_number > 0);
                assert!(!reference.path.is_empty());
            }
        }
    }
});
