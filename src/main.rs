use clap::{Arg, Command};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use translet::Settings;
use translet::storage::FileStorage;
use translet::vendors::{MockMode, MockVendor, Translator, TranslatorRegistry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let matches = Command::new("translet")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate a text snippet through the configured web vendor")
        .arg(
            Arg::new("text")
                .help("Text to translate")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("to")
                .help("Target language code (default: last used)")
                .index(2),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .short('f')
                .help("Source language code (default: last used, initially auto)"),
        )
        .arg(
            Arg::new("vendor")
                .long("vendor")
                .help("Vendor code name, e.g. google or bing (default: last used)"),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .help("Use the deterministic mock vendor instead of the network")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show vendor and language details")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let text = matches.get_one::<String>("text").unwrap();
    let offline = matches.get_flag("offline");
    let verbose = matches.get_flag("verbose");

    let storage = Arc::new(FileStorage::new(config_dir()));
    let settings = Settings::storage(storage.clone());
    settings.load().await;
    let current = settings.get();

    let mut registry = TranslatorRegistry::with_default_vendors(storage);
    if offline {
        registry.register(Translator::new(MockVendor::new(MockMode::Suffix)));
    }

    let vendor_name = if offline {
        "mock".to_string()
    } else {
        matches
            .get_one::<String>("vendor")
            .cloned()
            .unwrap_or(current.vendor)
    };
    let from = matches
        .get_one::<String>("from")
        .cloned()
        .unwrap_or(current.lang_from);
    let to = matches
        .get_one::<String>("to")
        .cloned()
        .unwrap_or(current.lang_to);

    // hop to the next capable vendor when the requested one cannot serve
    // the pair
    let translator = registry
        .get(&vendor_name)
        .filter(|t| t.can_translate(&from, &to))
        .or_else(|| registry.next_translator(&vendor_name, &from, &to, false))
        .ok_or_else(|| format!("no vendor can translate {} → {}", from, to))?;

    if verbose {
        let info = translator.info();
        println!("{} ({})", info.title, info.public_url);
        println!("{} → {}", from, to);
        println!();
    }
    if translator.name() != vendor_name {
        eprintln!(
            "{} cannot translate {} → {}, using {}",
            vendor_name,
            from,
            to,
            translator.name()
        );
    }

    match translator.get_translation(&from, &to, text).await {
        Ok(result) => {
            println!("{}", result.translation);
            if let Some(transcription) = &result.transcription {
                println!("[{}]", transcription);
            }
            if let Some(correction) = &result.spell_correction {
                println!("Did you mean: {}", correction);
            }
            for group in &result.dictionary {
                println!();
                println!("{}:", group.word_type);
                for meaning in &group.meanings {
                    println!("  {}: {}", meaning.word, meaning.translation.join(", "));
                }
            }
            if verbose && let Some(detected) = &result.lang_detected {
                println!();
                println!("Detected language: {}", detected);
            }

            settings
                .merge(json!({
                    "vendor": translator.name(),
                    "langFrom": result.lang_from,
                    "langTo": result.lang_to,
                }))
                .await?;
            Ok(())
        }
        Err(error) => {
            eprintln!("Translation failed: {}", error);
            if verbose && let Some(body) = &error.response_text {
                eprintln!("{}", body);
            }
            std::process::exit(1);
        }
    }
}

fn config_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".config").join("translet"))
        .unwrap_or_else(|| PathBuf::from("."))
}
