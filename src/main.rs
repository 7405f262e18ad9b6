// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! jarclient CLI - issue requests with a persistent cookie jar

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use bytes::Bytes;
use jarclient::http::parse_timeout;
use jarclient::{
    ClientConfig, CookieJar, HeaderField, Method, RequestBody, RequestClient, ResponseHeaders,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jarclient=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None | Some("--help" | "-h" | "help") => {
            print_usage();
            if args.is_empty() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Some("--version" | "-v" | "version") => {
            println!("jarclient {}", jarclient::VERSION);
            ExitCode::SUCCESS
        }
        Some(_) => match run(&args).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::from(1)
            }
        },
    }
}

fn print_usage() {
    println!(
        r#"jarclient - HTTP session client with a persistent cookie jar

USAGE:
    jarclient <METHOD> <url> [name=value ...] [OPTIONS]

METHODS:
    get, head, delete       Send a bodyless request
    post, put               Send name=value pairs as a URL-encoded form

OPTIONS:
    --cookies <file>        Load cookies from and save them to a JSON file
    --keep-session          Also save session cookies to the cookie file
    --agent <string>        User-Agent header (env: JARCLIENT_AGENT)
    --timeout <secs>        Transport timeout, 0 for none (env: JARCLIENT_TIMEOUT)

EXAMPLES:
    jarclient post https://example.com/login user=jane pass=secret --cookies jar.json
    jarclient get https://example.com/account --cookies jar.json
"#
    );
}

/// Parsed command line
struct Invocation {
    method: Method,
    url: String,
    fields: Vec<(String, String)>,
    cookie_file: Option<PathBuf>,
    keep_session: bool,
    agent: Option<String>,
    timeout: Option<u64>,
}

fn parse_args(args: &[String]) -> anyhow::Result<Invocation> {
    let method: Method = args[0].parse()?;
    let mut iter = args[1..].iter();
    let mut url = None;
    let mut invocation = Invocation {
        method,
        url: String::new(),
        fields: Vec::new(),
        cookie_file: None,
        keep_session: false,
        agent: None,
        timeout: None,
    };

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--cookies" => {
                let file = iter.next().context("--cookies needs a file")?;
                invocation.cookie_file = Some(PathBuf::from(file));
            }
            "--keep-session" => invocation.keep_session = true,
            "--agent" => {
                invocation.agent = Some(iter.next().context("--agent needs a value")?.clone());
            }
            "--timeout" => {
                let raw = iter.next().context("--timeout needs a value")?;
                invocation.timeout = Some(parse_timeout(raw)?);
            }
            flag if flag.starts_with("--") => bail!("unknown option: {}", flag),
            value if url.is_none() => url = Some(value.to_string()),
            field => {
                let (name, value) = field
                    .split_once('=')
                    .with_context(|| format!("expected name=value, got {:?}", field))?;
                invocation.fields.push((name.to_string(), value.to_string()));
            }
        }
    }

    invocation.url = url.context("missing <url>")?;
    if !invocation.fields.is_empty() && !invocation.method.has_body() {
        bail!("{} requests do not take form fields", invocation.method);
    }
    Ok(invocation)
}

async fn run(args: &[String]) -> anyhow::Result<ExitCode> {
    let invocation = parse_args(args)?;

    let mut config = ClientConfig::from_env()?;
    if let Some(agent) = invocation.agent.clone() {
        config = config.user_agent(agent);
    }
    if let Some(secs) = invocation.timeout {
        config = config.timeout(secs);
    }

    let jar = match &invocation.cookie_file {
        Some(path) if path.exists() => CookieJar::load(path)?,
        _ => CookieJar::new(),
    };

    let mut client = RequestClient::with_config(config)?;
    client.set_cookie_jar(Arc::new(jar.clone()));

    let (tx, rx) = tokio::sync::oneshot::channel();
    let on_complete = move |body: Bytes, headers: ResponseHeaders| {
        let _ = tx.send((body, headers));
    };
    let url = invocation.url.as_str();
    match invocation.method {
        Method::Get => client.get(url, on_complete)?,
        Method::Head => client.head(url, on_complete)?,
        Method::Delete => client.delete(url, on_complete)?,
        Method::Post => client.post(url, RequestBody::Form(invocation.fields), on_complete)?,
        Method::Put => client.put(url, RequestBody::Form(invocation.fields), on_complete)?,
    }

    let (body, headers) = rx.await.context("request was dropped before completing")?;

    if let Some(path) = &invocation.cookie_file {
        jar.save(path, invocation.keep_session)?;
    }

    if headers.is_transport_error() {
        eprintln!("Request failed ({}): {}", headers.status, headers.reason);
        return Ok(ExitCode::from(2));
    }

    println!("{} {}", headers.status, headers.reason);
    for (name, field) in headers.iter() {
        match field {
            HeaderField::Single(value) => println!("{}: {}", name, value),
            HeaderField::List(values) => {
                for value in values {
                    println!("{}: {}", name, value);
                }
            }
        }
    }
    println!();
    println!("{}", String::from_utf8_lossy(&body));

    if headers.status >= 400 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
