//! Shared test utilities for integration tests
//!
//! `FakeToolchain` stands in for `dtc`, `mkimage` and `fdtget` so the
//! scenario and the `fdtget` backend run without U-Boot's host tools. Its
//! `mkimage` writes a real FIT blob through the native serializer, and its
//! `fdtget` answers from that blob with the real tool's output formats.

use fitcheck::error::ProcessError;
use fitcheck::exec::ProcessRunner;
use fitcheck::tree::{FitNode, PropertyValue, TreeAccessor};
use fitcheck::verify::OracleTable;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Hash node order used by `templates/hash-images.its`.
pub const KERNEL_ALGOS: [&str; 7] = [
    "crc16-ccitt",
    "crc32",
    "md5",
    "sha1",
    "sha256",
    "sha384",
    "sha512",
];

/// What the fake `mkimage` should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitShape {
    /// Correct digests for every algorithm
    Good,
    /// Last byte of this algorithm's digest flipped
    FlipByte(&'static str),
    /// Hash node for this algorithm omitted
    DropAlgo(&'static str),
    /// Image named `firmware@1` instead of `kernel@1`
    NoKernel,
    /// `mkimage` exits non-zero
    Broken,
}

/// Fake device-tree toolchain; records every invocation.
pub struct FakeToolchain {
    shape: FitShape,
    pub calls: RefCell<Vec<(String, Vec<String>)>>,
}

impl FakeToolchain {
    pub fn new(shape: FitShape) -> Self {
        Self {
            shape,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(p, _)| p.clone()).collect()
    }

    fn dtc(&self, args: &[String]) -> Result<String, ProcessError> {
        let out = value_after(args, "-o").expect("dtc called without -o");
        let dtb = FitNode::new("")
            .with_string("model", "Sandbox Verified Boot Test")
            .with_string("compatible", "sandbox")
            .to_dtb();
        std::fs::write(out, dtb).unwrap();
        Ok(String::new())
    }

    fn mkimage(&self, args: &[String]) -> Result<String, ProcessError> {
        if self.shape == FitShape::Broken {
            return Err(ProcessError::Failed {
                program: "mkimage".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "Can't read test-kernel.bin".to_string(),
            });
        }
        let dtc_args = value_after(args, "-D").expect("mkimage called without -D");
        let include_dir = PathBuf::from(value_after(&split(dtc_args), "-i").unwrap());
        let dest = args.last().unwrap();

        let payload = std::fs::read(include_dir.join("test-kernel.bin")).unwrap();
        let dtb = std::fs::read(include_dir.join("sandbox-kernel.dtb")).unwrap();
        std::fs::write(dest, build_fit(&payload, &dtb, self.shape).to_dtb()).unwrap();
        Ok(String::new())
    }
}

impl ProcessRunner for FakeToolchain {
    fn run(&self, program: &str, args: &[String]) -> Result<String, ProcessError> {
        self.calls
            .borrow_mut()
            .push((program.to_string(), args.to_vec()));
        if args.first().map(String::as_str) == Some("--version") {
            return Ok(format!("{} (fake)\n", program));
        }
        match program {
            "dtc" => self.dtc(args),
            "mkimage" => self.mkimage(args),
            "fdtget" => fdtget(args),
            other => Err(ProcessError::Spawn {
                program: other.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not faked"),
            }),
        }
    }
}

/// The digests a real `mkimage` would embed. Only the oracle payload hashes
/// to the oracle digests; any other payload gets digests that cannot match.
fn digest_for(payload: &[u8], algo: &str) -> Vec<u8> {
    let oracle = OracleTable::kernel();
    let expected = hex::decode(oracle.get(algo).unwrap()).unwrap();
    if payload == vec![0xa5u8; 500].as_slice() {
        return expected;
    }
    blake3::hash(payload).as_bytes().iter().cycle().take(expected.len()).copied().collect()
}

/// FIT tree shaped like the one `mkimage -f hash-images.its` produces.
pub fn build_fit(payload: &[u8], dtb: &[u8], shape: FitShape) -> FitNode {
    let image_name = if shape == FitShape::NoKernel {
        "firmware@1"
    } else {
        "kernel@1"
    };
    let mut image = FitNode::new(image_name)
        .with_bytes("data", payload)
        .with_string("type", "kernel_noload")
        .with_string("arch", "sandbox")
        .with_string("os", "linux")
        .with_string("compression", "none");
    for (i, &algo) in KERNEL_ALGOS.iter().enumerate() {
        if shape == FitShape::DropAlgo(algo) {
            continue;
        }
        let mut value = digest_for(payload, algo);
        if shape == FitShape::FlipByte(algo) {
            if let Some(last) = value.last_mut() {
                *last ^= 0xff;
            }
        }
        image = image.with_child(
            FitNode::new(format!("hash-{}", i))
                .with_bytes("value", &value)
                .with_string("algo", algo),
        );
    }

    let fdt = FitNode::new("fdt@1")
        .with_string("description", "snow")
        .with_bytes("data", dtb)
        .with_string("type", "flat_dt")
        .with_child(
            FitNode::new("hash-0")
                .with_bytes("value", &[0xde, 0xad, 0xbe, 0xef])
                .with_string("algo", "crc32"),
        );

    FitNode::new("")
        .with_string("description", "Chrome OS kernel image with one or more FDT blobs")
        .with_bytes("timestamp", &[0x65, 0x00, 0x00, 0x00])
        .with_child(FitNode::new("images").with_child(image).with_child(fdt))
        .with_child(
            FitNode::new("configurations")
                .with_string("default", "conf@1")
                .with_child(
                    FitNode::new("conf@1")
                        .with_string("kernel", "kernel@1")
                        .with_string("fdt", "fdt@1"),
                ),
        )
}

/// Write a FIT of the given shape holding the oracle payload.
pub fn write_fit(dir: &Path, shape: FitShape) -> PathBuf {
    let path = dir.join("test.fit");
    let dtb = FitNode::new("").with_string("model", "sandbox").to_dtb();
    std::fs::write(&path, build_fit(&[0xa5; 500], &dtb, shape).to_dtb()).unwrap();
    path
}

/// Answer an `fdtget` query the way the real tool prints results.
fn fdtget(args: &[String]) -> Result<String, ProcessError> {
    let not_found = |what: &str| ProcessError::Failed {
        program: "fdtget".to_string(),
        status: "exit status: 1".to_string(),
        stderr: format!("Error at '{}': FDT_ERR_NOTFOUND", what),
    };
    let (flag, rest) = match args.first().map(String::as_str) {
        Some(f) if f.starts_with('-') => (Some(f), &args[1..]),
        _ => (None, args),
    };
    let tree = FitNode::load(Path::new(&rest[0])).map_err(|e| ProcessError::Failed {
        program: "fdtget".to_string(),
        status: "exit status: 1".to_string(),
        stderr: e.to_string(),
    })?;

    match flag {
        Some("-l") => {
            let children = tree.list_children(&rest[1]).map_err(|_| not_found(&rest[1]))?;
            Ok(children.iter().map(|c| format!("{}\n", c)).collect())
        }
        Some("-tbx") => {
            let value = tree
                .get_property_value(&rest[1], &rest[2])
                .map_err(|_| not_found(&rest[1]))?;
            let tokens: Vec<String> = value.to_raw().iter().map(|b| format!("{:x}", b)).collect();
            Ok(format!("{}\n", tokens.join(" ")))
        }
        None => {
            let value: PropertyValue = tree
                .get_property_value(&rest[1], &rest[2])
                .map_err(|_| not_found(&rest[1]))?;
            Ok(format!("{}\n", value.render()))
        }
        Some(other) => panic!("unexpected fdtget flag {}", other),
    }
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
}

fn split(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

/// Directory holding the shipped image description and device-tree source.
pub fn templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}
