// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Testhook CLI
//!
//! Inspect the hooks a page exposes before writing tests against it.

use std::env;
use std::process::ExitCode;

use anyhow::Context;

use testhook::{HelperConfig, TestContext};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("testhook=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let outcome = match args[1].as_str() {
        "hooks" => {
            if args.len() < 3 {
                eprintln!("Usage: testhook hooks <url>");
                return ExitCode::from(1);
            }
            list_hooks(&args[2]).await
        }
        "inspect" => {
            if args.len() < 4 {
                eprintln!("Usage: testhook inspect <url> <hook> [index]");
                return ExitCode::from(1);
            }
            let index = match args.get(4).map(|s| s.parse::<usize>()) {
                Some(Ok(i)) => i,
                Some(Err(_)) => {
                    eprintln!("Index must be a non-negative integer");
                    return ExitCode::from(1);
                }
                None => 0,
            };
            inspect_hook(&args[2], &args[3], index).await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("testhook {}", testhook::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Testhook - Given/When/Get test helper

USAGE:
    testhook <COMMAND> [OPTIONS]

COMMANDS:
    hooks <url>                   List every element carrying the hook attribute
    inspect <url> <hook> [index]  Show the state of one hooked element
    help                          Show this help message
    version                       Show version information

ENVIRONMENT:
    TESTHOOK_HOOK_ATTRIBUTE       Hook attribute name (default: data-hook)
    TESTHOOK_TIMEOUT_MS           Element wait timeout (default: 4000)
    TESTHOOK_POLL_MS              Element wait poll interval (default: 25)

EXAMPLES:
    testhook hooks http://localhost:8080/index.html
    testhook inspect http://localhost:8080/index.html name-input
    testhook inspect http://localhost:8080/index.html radio 2
"#
    );
}

async fn start(url: &str) -> anyhow::Result<TestContext> {
    let config = HelperConfig::from_env().context("invalid TESTHOOK_* environment")?;
    let ctx = TestContext::start(config).context("failed to start test context")?;
    let response = ctx
        .when()
        .visit(url)
        .await
        .with_context(|| format!("failed to load {}", url))?;
    println!("Loaded: {} ({}, {}ms)", response.url, response.status, response.response_time_ms);
    Ok(ctx)
}

async fn list_hooks(url: &str) -> anyhow::Result<ExitCode> {
    let ctx = start(url).await?;
    let attribute = ctx.config().hook_attribute.clone();
    let doc = ctx.page().require_document()?;
    let hooks = doc.hook_values(&attribute);

    if hooks.is_empty() {
        println!("\nNo elements carry [{}]", attribute);
        return Ok(ExitCode::SUCCESS);
    }

    println!("\n=== Hooks ({}) ===", hooks.len());
    for (hook, count) in &hooks {
        let Some(first) = doc.find_by_hook(&attribute, hook).into_iter().next() else {
            continue;
        };
        let mut line = format!("  {:<24} <{}>", hook, first.local_name());
        if let Some(kind) = first.input_type() {
            line.push_str(&format!(" type={}", kind));
        }
        if *count > 1 {
            line.push_str(&format!(" x{}", count));
        }
        if first.disabled() {
            line.push_str(" disabled");
        }
        println!("{}", line);
    }

    Ok(ExitCode::SUCCESS)
}

async fn inspect_hook(url: &str, hook: &str, index: usize) -> anyhow::Result<ExitCode> {
    let ctx = start(url).await?;
    let get = ctx.get();

    let element = match get.element_by_test_id(hook, index).await {
        Ok(element) => element,
        Err(e) if e.is_timeout() => {
            println!("\n[!] {}", e);
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };

    println!("\n=== {} (index {}) ===", hook, index);
    println!("Tag: <{}>", element.local_name());
    println!("Text: {}", element.text_content().trim());
    if let Some(value) = element.value() {
        println!("Value: {}", value);
    }
    println!("Disabled: {}", element.disabled());
    if element.is_checkable() {
        println!("Checked: {}", element.checked());
    }

    let style = get.elements_computed_style(hook, index).await?;
    if !style.is_empty() {
        println!("Style:");
        let mut properties: Vec<_> = style.properties().iter().collect();
        properties.sort();
        for (name, value) in properties {
            println!("  {}: {}", name, value);
        }
    }

    Ok(ExitCode::SUCCESS)
}
