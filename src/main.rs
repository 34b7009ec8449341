use log::{debug, error};
use std::env;
use std::process::ExitCode;

use film_recommender::config::AppConfig;
use film_recommender::{MediaType, Mood, RecommendError, Recommender};

const USAGE: &str = "Usage: film-recommender [--dizi|--film] [--category <name>]... [--mood <mutlu|uzgun|heyecanli|rahat|nostaljik>] [--translate] [--history <dir>] [prompt...]
       film-recommender [--dizi|--film] --trending
       film-recommender [--translate] --person <id>";

const TRENDING_LIMIT: usize = 5;

enum Mode {
    Recommend,
    Trending,
    Person(u64),
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:?}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Vec<String>) -> Result<String, RecommendError> {
    let mut builder = Recommender::builder();
    let mut prompt = Vec::new();
    let mut mode = Mode::Recommend;
    let mut kind = MediaType::Movie;
    let mut translate = false;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dizi" => {
                kind = MediaType::Tv;
                builder = builder.dizi();
            }
            "--film" => {
                kind = MediaType::Movie;
                builder = builder.film();
            }
            "--translate" => {
                translate = true;
                builder = builder.translate_overviews(true);
            }
            "--trending" => mode = Mode::Trending,
            "--person" => {
                let id = value_for(&arg, args.next())?.parse().map_err(|_| {
                    RecommendError::InvalidInput("--person needs a numeric id".to_string())
                })?;
                mode = Mode::Person(id);
            }
            "--category" => builder = builder.category(value_for(&arg, args.next())?),
            "--mood" => {
                let mood: Mood = value_for(&arg, args.next())?
                    .parse()
                    .map_err(RecommendError::InvalidInput)?;
                builder = builder.mood(mood);
            }
            "--history" => builder = builder.history(value_for(&arg, args.next())?),
            flag if flag.starts_with("--") => {
                return Err(RecommendError::InvalidInput(format!(
                    "Unknown option {}\n{}",
                    flag, USAGE
                )))
            }
            word => prompt.push(word.to_string()),
        }
    }

    let json = match mode {
        Mode::Recommend => {
            let prompt = prompt.join(" ");
            debug!("Prompt: {:?}", prompt);
            let recommendations = builder.prompt(prompt).build().await?;
            serde_json::to_string_pretty(&recommendations)?
        }
        Mode::Trending => {
            let recommender = Recommender::from_config(&AppConfig::load()?)?;
            serde_json::to_string_pretty(&recommender.trending(kind, TRENDING_LIMIT).await?)?
        }
        Mode::Person(id) => {
            let config = AppConfig::load()?;
            let recommender = Recommender::from_config(&config)?
                .with_translation(translate || config.enrich.translate_overviews);
            serde_json::to_string_pretty(&recommender.person(id).await?)?
        }
    };
    Ok(json)
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, RecommendError> {
    value.ok_or_else(|| RecommendError::InvalidInput(format!("{} needs a value", flag)))
}
