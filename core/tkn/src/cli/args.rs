use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use std::io;
use std::path::PathBuf;
use tokenizer::domain::{Credentials, Field, Operation};
use tokenizer::Error;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub help: bool,
    /// tokenize / detokenize（help 以外では必須）
    pub operation: Option<Operation>,
    /// --firstname 等で直接与えた値（指定があれば stdin は読まない）
    pub fields: Vec<(Field, String)>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// --timeout-ms: 環境変数の TOKENIZE_TIMEOUT_MS より優先
    pub timeout_ms: Option<u64>,
    /// -v / --verbose: ライフサイクルログを stderr に出す
    pub verbose: bool,
    /// --log-file: JSONL ログの出力先（TOKENIZE_LOG_FILE より優先）
    pub log_file: Option<PathBuf>,
    /// --keep-raw-on-error: 配列入力で失敗したレコードを元のまま出力して続行する
    pub keep_raw_on_error: bool,
}

impl Config {
    /// --username / --password の組（両方指定時のみ）
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => Some(Credentials::new(u.clone(), p.clone())),
            _ => None,
        }
    }
}

/// 解析結果: 通常の Config / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

/// フィールド値フラグ（引数 ID とフィールドの対応）
const FIELD_ARGS: [(&str, Field); 5] = [
    ("firstname", Field::Firstname),
    ("lastname", Field::Lastname),
    ("phone", Field::Phone),
    ("creditcard", Field::Creditcard),
    ("idcard", Field::IDcard),
];

fn build_clap_command() -> clap::Command {
    let mut cmd = clap::Command::new("tkn")
        .about("Tokenize or detokenize personal data through the tokenization API")
        .disable_help_flag(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("operation")
                .index(1)
                .value_name("operation")
                .help("tokenize or detokenize")
                .value_parser(["tokenize", "detokenize"])
                .num_args(1),
        );
    for (id, field) in FIELD_ARGS {
        cmd = cmd.arg(
            clap::Arg::new(id)
                .long(id)
                .value_name("value")
                .help(format!("{} value (skips reading stdin)", field))
                .num_args(1),
        );
    }
    cmd.arg(
        clap::Arg::new("username")
            .long("username")
            .value_name("user")
            .help("Override TOKENIZE_API_USERNAME for this call (requires --password)")
            .num_args(1),
    )
    .arg(
        clap::Arg::new("password")
            .long("password")
            .value_name("password")
            .help("Override TOKENIZE_API_PASSWORD for this call (requires --username)")
            .num_args(1),
    )
    .arg(
        clap::Arg::new("timeout-ms")
            .long("timeout-ms")
            .value_name("ms")
            .help("Request timeout in milliseconds")
            .value_parser(value_parser!(u64).range(1..))
            .num_args(1),
    )
    .arg(
        clap::Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("Emit lifecycle logs to stderr")
            .action(ArgAction::SetTrue),
    )
    .arg(
        clap::Arg::new("log-file")
            .long("log-file")
            .value_name("path")
            .help("Append JSONL logs to this file")
            .value_parser(value_parser!(PathBuf))
            .num_args(1),
    )
    .arg(
        clap::Arg::new("keep-raw-on-error")
            .long("keep-raw-on-error")
            .help("For array input, emit failed records unchanged instead of aborting")
            .action(ArgAction::SetTrue),
    )
    .arg(
        clap::Arg::new("generate")
            .long("generate")
            .value_name("shell")
            .help("Generate shell completion script")
            .value_parser(value_parser!(Shell))
            .num_args(1),
    )
}

fn matches_to_config(matches: &clap::ArgMatches) -> Result<Config, Error> {
    let help = matches.get_flag("help");
    let operation = matches
        .get_one::<String>("operation")
        .map(|s| match s.as_str() {
            "detokenize" => Operation::Detokenize,
            _ => Operation::Tokenize,
        });
    let fields = FIELD_ARGS
        .iter()
        .filter_map(|(id, field)| matches.get_one::<String>(id).map(|v| (*field, v.clone())))
        .collect();
    let username = matches.get_one::<String>("username").cloned();
    let password = matches.get_one::<String>("password").cloned();
    if username.is_some() != password.is_some() {
        return Err(Error::invalid_argument(
            "--username and --password must be given together",
        ));
    }

    Ok(Config {
        help,
        operation,
        fields,
        username,
        password,
        timeout_ms: matches.get_one::<u64>("timeout-ms").copied(),
        verbose: matches.get_flag("verbose"),
        log_file: matches.get_one::<PathBuf>("log-file").cloned(),
        keep_raw_on_error: matches.get_flag("keep-raw-on-error"),
    })
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let cmd = build_clap_command();
    let matches = cmd
        .try_get_matches()
        .map_err(|e| Error::invalid_argument(e.to_string()))?;

    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }

    Ok(ParseOutcome::Config(matches_to_config(&matches)?))
}

/// テスト用: 引数スライスから解析する
#[allow(dead_code)]
pub fn parse_args_from(args: &[String]) -> Result<Config, Error> {
    let cmd = build_clap_command();
    let matches = cmd
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    matches_to_config(&matches)
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "tkn", &mut io::stdout());
}
