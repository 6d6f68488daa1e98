//! Stand-in for ffmpeg that understands the two invocations the pipeline makes.
//!
//! - `-i concat:a|b|c ... <out>`: writes the inputs back to back.
//! - `-i v -i a -c:v <codec> ... <out>`: writes `[<codec>]` then both inputs.

use std::ffi::OsString;
use std::io;
use std::sync::Mutex;

use segclip_core::assembly::{MediaTool, ToolOutput};
use segclip_core::workspace::ProcessTracker;

#[derive(Default)]
pub struct FakeTool {
    calls: Mutex<Vec<Vec<String>>>,
}

impl FakeTool {
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl MediaTool for FakeTool {
    fn run(&self, args: &[OsString], _processes: &ProcessTracker) -> io::Result<ToolOutput> {
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        self.calls.lock().unwrap().push(args.clone());

        let inputs: Vec<&str> = args
            .windows(2)
            .filter(|w| w[0] == "-i")
            .map(|w| w[1].as_str())
            .collect();
        let out = args.last().cloned().unwrap_or_default();
        let mut bytes = Vec::new();
        match inputs.first().and_then(|i| i.strip_prefix("concat:")) {
            Some(list) => {
                for part in list.split('|') {
                    bytes.extend(std::fs::read(part)?);
                }
            }
            None => {
                let codec = args
                    .windows(2)
                    .find(|w| w[0] == "-c:v")
                    .map(|w| w[1].clone())
                    .unwrap_or_default();
                bytes.extend(format!("[{}]", codec).into_bytes());
                for input in inputs {
                    bytes.extend(std::fs::read(input)?);
                }
            }
        }
        std::fs::write(&out, bytes)?;
        Ok(ToolOutput {
            success: true,
            code: Some(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}
