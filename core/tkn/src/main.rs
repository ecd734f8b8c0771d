mod app;
mod cli;
mod wiring;

#[cfg(test)]
mod tests;

use app::{read_input, App};
use cli::{parse_args, print_completion, Config, ParseOutcome};
use std::io::{self, Read, Write};
use std::process;
use tokenizer::adapter::StdEnvResolver;
use tokenizer::ports::outbound::{LogLevel, LogRecord};
use tokenizer::Error;
use wiring::wire_tkn;

/// 入力を読み、App で処理して出力する Runner（ライフサイクルログもここで出す）
struct Runner {
    app: App,
}

impl Runner {
    fn run(&self, config: &Config, input: &mut dyn Read, output: &mut dyn Write) -> Result<i32, Error> {
        if config.help {
            print_help();
            return Ok(0);
        }
        let operation = config
            .operation
            .ok_or_else(|| Error::invalid_argument("missing operation: tokenize or detokenize"))?;

        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "cli", "lifecycle", "command started")
                .field("command", serde_json::json!(operation.as_str())),
        );

        let result = read_input(config, input).and_then(|input| {
            let records = match &input {
                app::Input::Single(_) => 1,
                app::Input::Batch(rows) => rows.len(),
            };
            let credentials = config.credentials();
            let value = self.app.process(
                operation,
                input,
                credentials.as_ref(),
                config.keep_raw_on_error,
            )?;
            writeln!(output, "{}", serde_json::to_string_pretty(&value)?)?;
            Ok(records)
        });

        let code = match &result {
            Ok(_) => 0,
            Err(e) => e.exit_code(),
        };
        let mut finished = LogRecord::new(LogLevel::Info, "cli", "lifecycle", "command finished")
            .field("command", serde_json::json!(operation.as_str()))
            .field("exit_code", serde_json::json!(code));
        if let Ok(records) = &result {
            finished = finished.field("records", serde_json::json!(records));
        }
        let _ = self.app.logger.log(&finished);
        if let Err(ref e) = result {
            let _ = self
                .app
                .logger
                .log(&LogRecord::new(LogLevel::Error, "cli", "error", e.to_string()));
        }
        result.map(|_| 0)
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("tkn: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let config = match parse_args()? {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    let runner = Runner {
        app: wire_tkn(&config, &StdEnvResolver),
    };
    let stdin = io::stdin();
    let stdout = io::stdout();
    runner.run(&config, &mut stdin.lock(), &mut stdout.lock())
}

fn print_usage() {
    eprintln!("Usage: tkn <tokenize|detokenize> [options] < records.json");
}

fn print_help() {
    println!("Usage: tkn <tokenize|detokenize> [options] < records.json");
    println!("Options:");
    println!("  -h, --help                 Show this help message");
    println!("  --firstname <value>        Firstname value (also --lastname, --phone, --creditcard, --idcard)");
    println!("                             When any field flag is given, stdin is not read.");
    println!("  --username <user>          Override TOKENIZE_API_USERNAME for this call (requires --password)");
    println!("  --password <password>      Override TOKENIZE_API_PASSWORD for this call (requires --username)");
    println!("  --timeout-ms <ms>          Request timeout in milliseconds (default: TOKENIZE_TIMEOUT_MS or 10000)");
    println!("  --keep-raw-on-error        For array input, emit failed records unchanged instead of aborting");
    println!("  -v, --verbose              Emit lifecycle logs to stderr");
    println!("  --log-file <path>          Append JSONL logs to this file (default: TOKENIZE_LOG_FILE)");
    println!("  --generate <shell>         Generate shell completion script (bash, zsh, fish)");
    println!();
    println!("Environment:");
    println!("  TOKENIZE_API_URL               Tokenize endpoint (required)");
    println!("  TOKENIZE_DETOKENIZE_API_URL    Detokenize endpoint (default: derived from TOKENIZE_API_URL)");
    println!("  TOKENIZE_API_USERNAME          Basic auth user");
    println!("  TOKENIZE_API_PASSWORD          Basic auth password");
    println!("  TOKENIZE_API_GROUP             Token group (default: Test)");
    println!("  TOKENIZE_NAME_TEMPLATE         Template for Firstname/Lastname (default: NameTemplate)");
    println!("  TOKENIZE_CREDITCARD_TEMPLATE   Template for Phone/Creditcard/IDcard (default: CreditCardTemplate)");
    println!("  TOKENIZE_TIMEOUT_MS            Request timeout in milliseconds (default: 10000)");
    println!("  TOKENIZE_ALLOW_INSECURE_TLS    Accept invalid TLS certificates when \"true\"");
    println!();
    println!("Input:");
    println!("  A JSON object, or an array of objects processed one call per element.");
    println!("  Keys other than the five fields (e.g. id) are passed through unchanged.");
    println!();
    println!("Examples:");
    println!("  tkn tokenize --firstname Ann --phone 0812345678");
    println!("  tkn detokenize --keep-raw-on-error < customers.json");
}
