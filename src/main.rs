use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

mod bot;
mod dispatcher;
mod error;
mod responses;
mod rules;
mod sentiment;
mod settings;
mod template;
mod validate;

use bot::Bot;
use dispatcher::IntentDispatcher;
use responses::ResponseSet;
use rules::RuleSet;
use sentiment::{Lexicon, SentimentBot};
use settings::{BotKind, Settings};

// --- Wire types ---
#[derive(Deserialize)]
struct AskRequest {
    user_input: String,
}
#[derive(Serialize, Deserialize, Debug)]
struct AskResponse {
    response: String,
}
#[derive(Serialize, Deserialize, Debug)]
struct ErrorResponse {
    error: String,
}

/// Shared between workers. The bot is read-only; only the random source needs a lock.
struct AppState {
    bot: Box<dyn Bot>,
    rng: Mutex<StdRng>,
}

impl AppState {
    fn new(bot: Box<dyn Bot>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            bot,
            rng: Mutex::new(rng),
        }
    }
}

fn build_bot(settings: &Settings) -> Result<Box<dyn Bot>> {
    let data = &settings.data;
    match settings.bot.kind {
        BotKind::Pattern => {
            let rules = RuleSet::load(&data.rules_file, data.case_insensitive)?;
            let responses = ResponseSet::load(&data.responses_file)?;
            if rules.is_empty() || responses.is_empty() {
                log::warn!("No rules or no responses loaded, every input gets the fallback");
            }

            let findings = validate::check(&rules, &responses);
            let fatal = findings.iter().filter(|f| f.is_fatal()).count();
            for finding in &findings {
                if finding.is_fatal() {
                    log::error!("{}", finding);
                } else {
                    log::warn!("{}", finding);
                }
            }
            if fatal > 0 && settings.logic.strict_templates {
                anyhow::bail!(
                    "{} response templates can never be filled by their rules",
                    fatal
                );
            }

            Ok(Box::new(IntentDispatcher::new(rules, responses)))
        }
        BotKind::Sentiment => {
            let lexicon_file = data
                .lexicon_file
                .as_deref()
                .context("data.lexicon_file is required for the sentiment bot")?;
            let responses_file = data
                .sentiment_responses_file
                .as_deref()
                .context("data.sentiment_responses_file is required for the sentiment bot")?;
            let lexicon = Lexicon::load(lexicon_file)?;
            let responses = ResponseSet::load(responses_file)?;
            if responses.is_empty() {
                log::warn!("No sentiment responses loaded, every input gets the fallback");
            }
            Ok(Box::new(SentimentBot::new(lexicon, responses)))
        }
    }
}

// --- Web Server Endpoints ---
#[post("/ask")]
async fn ask_endpoint(req: web::Json<AskRequest>, state: web::Data<AppState>) -> impl Responder {
    let result = {
        let mut rng = state.rng.lock();
        state.bot.respond_with(&req.user_input, &mut *rng)
    };
    match result {
        Ok(response) => HttpResponse::Ok().json(AskResponse { response }),
        Err(err) => {
            log::error!("Failed to answer {:?}: {}", req.user_input, err);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: err.to_string(),
            })
        }
    }
}

#[get("/health")]
async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "bot": state.bot.name(),
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load("Config")?;
    let bot = build_bot(&settings)?;
    log::info!("Initialized '{}' bot", bot.name());

    let data = web::Data::new(AppState::new(bot, settings.logic.seed));
    let host = settings.server.host.clone();
    let port = settings.server.port;

    log::info!("Starting server at http://{}:{}", host, port);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .service(health)
            .service(ask_endpoint)
    })
    .bind((host, port))?
    .run()
    .await?;
    Ok(())
}
