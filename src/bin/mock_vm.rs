//! Mock MathVM interpreter for integration testing
//!
//! Interprets a tiny directive language instead of MathVM programs, so that
//! tests can script exactly what reaches stdout and stderr:
//!
//! ```text
//! print <text>    write a line to stdout
//! eprint <text>   write a line to stderr
//! pause           write the keypress prompt (suppressed by -silent)
//! args            write each extra argument on its own line
//! mode            write "native" or "interpreted"
//! sleep <ms>      sleep
//! exit <code>     exit immediately
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::io::Write;
use std::process::exit;
use std::time::Duration;

use mvm_regress::testing::{NATIVE_FLAG, PRESS_ANY_KEY, SILENT_FLAG};

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((input, flags)) = args.split_first() else {
        eprintln!("usage: mock_vm <program> [-native] [-silent]");
        exit(64);
    };

    let source = match std::fs::read_to_string(input) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("mock_vm: cannot read {input}: {e}");
            exit(2);
        }
    };

    let silent = flags.iter().any(|f| f == SILENT_FLAG);
    let native = flags.iter().any(|f| f == NATIVE_FLAG);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for (number, line) in source.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let (directive, rest) = line.split_once(' ').unwrap_or((line, ""));

        match directive {
            "print" => {
                writeln!(out, "{rest}").ok();
            }
            "eprint" => {
                out.flush().ok();
                eprintln!("{rest}");
            }
            "pause" => {
                if !silent {
                    writeln!(out, "{PRESS_ANY_KEY}").ok();
                }
            }
            "args" => {
                for flag in flags {
                    writeln!(out, "{flag}").ok();
                }
            }
            "mode" => {
                let mode = if native { "native" } else { "interpreted" };
                writeln!(out, "{mode}").ok();
            }
            "sleep" => {
                let ms = rest.trim().parse().unwrap_or(0);
                out.flush().ok();
                std::thread::sleep(Duration::from_millis(ms));
            }
            "exit" => {
                out.flush().ok();
                exit(rest.trim().parse().unwrap_or(1));
            }
            other => {
                out.flush().ok();
                eprintln!("mock_vm: line {}: unknown directive '{other}'", number + 1);
                exit(1);
            }
        }
    }

    out.flush().ok();
}
