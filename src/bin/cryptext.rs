//! Cryptext CLI - Classical text encodings with password-protected envelopes
//!
//! Command-line interface for encoding and decoding files using classical
//! text-encoding methods, optionally wrapped in a password envelope
//! (PBKDF2-HMAC-SHA256 key derivation + AES-256-GCM).

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use cryptext::codec::Method;
use cryptext::error::{ErrorKind, Result};
use cryptext::file_ops;
use cryptext::password::{
    self, PasswordReader, ReaderPasswordReader, TerminalPasswordReader,
};

/// Additional password prompts allowed after a failed interactive unwrap
const PASSWORD_RETRIES: u32 = 2;

#[derive(Parser)]
#[command(name = "cryptext")]
#[command(version)]
#[command(about = "Classical text encodings with password-protected envelopes.", long_about = None)]
struct Cli {
    /// Read password from stdin instead of from terminal
    #[arg(long, global = true)]
    password_stdin: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file
    #[command(alias = "e")]
    Encode {
        /// Encoding method (caesar, atbash, rot13, reverse, base64, hex, binary, morse)
        #[arg(short, long, value_name = "METHOD")]
        method: String,

        /// Path to the file whose contents is to be encoded
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the encoded text to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Wrap the encoded text in a password envelope
        #[arg(short, long)]
        wrap: bool,
    },

    /// Decode a file, unwrapping it first if it is password-wrapped
    #[command(alias = "d")]
    Decode {
        /// Encoding method (caesar, atbash, rot13, reverse, base64, hex, binary, morse)
        #[arg(short, long, value_name = "METHOD")]
        method: String,

        /// Path to the file whose contents is to be decoded
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the decoded text to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Generate a random password
    #[command(name = "generate-key", alias = "g")]
    GenerateKey {
        /// Number of random bytes backing the password
        #[arg(long, default_value_t = 32)]
        bytes: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Encode {
            method,
            input,
            output,
            wrap,
        } => {
            let method: Method = method.parse()?;
            if wrap {
                let mut reader = get_password_reader(cli.password_stdin);
                file_ops::encode_file(&input, &output, method, Some(&mut *reader))
            } else {
                file_ops::encode_file(&input, &output, method, None)
            }
        }
        Commands::Decode {
            method,
            input,
            output,
        } => {
            let method: Method = method.parse()?;
            if cli.password_stdin {
                let mut reader = ReaderPasswordReader::new(Box::new(std::io::stdin()));
                file_ops::decode_file(&input, &output, method, &mut reader)
            } else {
                decode_with_prompt(&input, &output, method)
            }
        }
        Commands::GenerateKey { bytes } => {
            println!("{}", password::generate_password(bytes));
            Ok(())
        }
    }
}

/// Decode with an interactive password prompt, re-prompting a limited
/// number of times when authentication fails. The failure message never
/// says whether the password or the data was at fault.
fn decode_with_prompt(input: &Path, output: &Path, method: Method) -> Result<()> {
    let mut reader = TerminalPasswordReader::new();
    let mut attempts = 0;

    loop {
        match file_ops::decode_file(input, output, method, &mut reader) {
            Err(e)
                if e.kind == Some(ErrorKind::AuthenticationFailed)
                    && attempts < PASSWORD_RETRIES =>
            {
                attempts += 1;
                eprintln!("Authentication failed; try again.");
            }
            result => return result,
        }
    }
}

fn get_password_reader(use_stdin: bool) -> Box<dyn PasswordReader> {
    if use_stdin {
        Box::new(ReaderPasswordReader::new(Box::new(std::io::stdin())))
    } else {
        Box::new(TerminalPasswordReader::new())
    }
}
