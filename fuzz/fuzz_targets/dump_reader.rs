#![no_main]

use blockscope::{
    cfg::{dump_to_string, parse_dump},
    ir::DumpOptions,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(cfg) = parse_dump(text) else {
        return;
    };
    // Anything the reader accepts must render, and the rendering must read back stably
    if let Ok(first) = dump_to_string(&cfg, &DumpOptions::default()) {
        if let Ok(again) = parse_dump(&first) {
            let second = dump_to_string(&again, &DumpOptions::default());
            assert_eq!(second.ok().as_deref(), Some(first.as_str()));
        }
    }
});
