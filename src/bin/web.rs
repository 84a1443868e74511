//! Single binary web server: JSON API over the bracket engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.

use actix_web::{
    get, post,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use bracket_tournament_web::{
    advance_winner, create_tournament, match_view, tournament_data, tournaments_for_owner,
    BracketView, EntryId, EntryInput, MatchId, MemoryStore, OwnerId, ServerConfig, StoreError,
    TournamentError, TournamentId, TournamentType,
};
use serde::{Deserialize, Serialize};

type AppState = Data<MemoryStore>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    owner_id: OwnerId,
    name: String,
    #[serde(rename = "type", default)]
    kind: TournamentType,
    entries: Vec<EntryInput>,
}

#[derive(Deserialize)]
struct OwnerQuery {
    owner_id: OwnerId,
}

#[derive(Deserialize)]
struct AdvanceBody {
    winner_id: EntryId,
}

#[derive(Serialize)]
struct AdvanceResponse {
    tournament_id: TournamentId,
    winner_slot: Option<u8>,
    next_match_id: Option<MatchId>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segment: match id (e.g. /api/matches/{id})
#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

/// Run store work on the blocking pool; store transactions hold a lock for their duration.
async fn run<T, F>(state: &AppState, work: F) -> Result<T, TournamentError>
where
    T: Send + 'static,
    F: FnOnce(&MemoryStore) -> Result<T, TournamentError> + Send + 'static,
{
    let store = state.clone().into_inner();
    match tokio::task::spawn_blocking(move || work(&store)).await {
        Ok(result) => result,
        Err(e) => Err(TournamentError::Persistence(StoreError::Backend(e.to_string()))),
    }
}

/// Validation errors get their message, missing ids a 404, store failures a generic 500.
fn error_response(context: &str, err: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.client_message() });
    match err {
        TournamentError::NotFound { .. } => {
            log::warn!("{context}: {err}");
            HttpResponse::NotFound().json(body)
        }
        TournamentError::Persistence(_) => {
            log::error!("{context}: {err:?}");
            HttpResponse::InternalServerError().json(body)
        }
        _ => {
            log::warn!("{context}: {err}");
            HttpResponse::BadRequest().json(body)
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-tournament-web",
    })
}

/// Create a tournament with its bracket; returns the full tournament data.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    let result = run(&state, move |store| {
        let id = create_tournament(store, body.owner_id, &body.name, body.kind, &body.entries)?;
        tournament_data(store, id)
    })
    .await;
    match result {
        Ok(data) => HttpResponse::Created().json(data),
        Err(e) => error_response("Failed to create tournament", &e),
    }
}

/// List tournaments for an owner (newest first).
#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState, query: Query<OwnerQuery>) -> HttpResponse {
    let owner_id = query.owner_id;
    match run(&state, move |store| tournaments_for_owner(store, owner_id)).await {
        Ok(tournaments) => HttpResponse::Ok().json(tournaments),
        Err(e) => error_response("Failed to list tournaments", &e),
    }
}

/// Get a tournament with entries, matches and the match up next.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    match run(&state, move |store| tournament_data(store, id)).await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => error_response("Failed to get tournament", &e),
    }
}

/// Matches grouped into bracket columns.
#[get("/api/tournaments/{id}/bracket")]
async fn api_get_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let id = path.id;
    let result = run(&state, move |store| {
        tournament_data(store, id).map(|data| BracketView::from_matches(&data.matches))
    })
    .await;
    match result {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response("Failed to get bracket", &e),
    }
}

/// One match with its seated entries.
#[get("/api/matches/{id}")]
async fn api_get_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    let id = path.id;
    match run(&state, move |store| match_view(store, id)).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response("Failed to get match data", &e),
    }
}

/// Declare the winner of a match and propagate it through the bracket.
#[post("/api/matches/{id}/advance")]
async fn api_advance_winner(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<AdvanceBody>,
) -> HttpResponse {
    let match_id = path.id;
    let winner_id = body.winner_id;
    let result = run(&state, move |store| {
        let tournament_id = advance_winner(store, match_id, winner_id)?;
        let view = match_view(store, match_id)?;
        Ok(AdvanceResponse {
            tournament_id,
            winner_slot: view.game.winner_slot.map(u8::from),
            next_match_id: view.next_match_id,
        })
    })
    .await;
    match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => error_response("Failed to advance winner", &e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let (host, port) = config.bind_addr();
    log::info!("Starting server at http://{}:{}", host, port);

    let state = Data::new(MemoryStore::new());

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_list_tournaments)
            .service(api_get_tournament)
            .service(api_get_bracket)
            .service(api_get_match)
            .service(api_advance_winner)
    })
    .bind(config.bind_addr())?
    .run()
    .await
}
