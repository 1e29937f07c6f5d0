#![no_main]

use libfuzzer_sys::fuzz_target;
use yaml_core::{Document, Parser};

fuzz_target!(|data: &[u8]| fuzz_target(data));

fn fuzz_target(mut data: &[u8]) {
    let mut parser = Parser::new();
    parser.set_input(&mut data);

    while let Ok(document) = Document::load(&mut parser) {
        if document.root().is_none() {
            break;
        }
    }
}
