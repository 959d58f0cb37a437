#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use sandshell_fs::Sandbox;

static SANDBOX: OnceLock<Sandbox> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    let sandbox = SANDBOX.get_or_init(|| {
        let root = std::env::temp_dir().join("sandshell-fuzz-root");
        Sandbox::create(root).expect("create fuzz sandbox")
    });
    if let Ok(input) = std::str::from_utf8(data) {
        // Whatever resolves must stay under the root.
        if let Ok(path) = sandbox.resolve(sandbox.root(), input) {
            assert!(sandbox.contains(&path), "escaped: {input:?} -> {path:?}");
        }
    }
});
