use axum::{
    Router,
    routing::get,
};
use sea_orm::DatabaseConnection;

use std::sync::Arc;

use crate::{expenses, lookups};
use engine::UserClock;

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub clock: Arc<UserClock>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, clock: UserClock) -> Self {
        Self {
            db,
            clock: Arc::new(clock),
        }
    }
}

pub(crate) fn router(state: ServerState) -> Router {
    Router::new()
        .route("/expenses", get(expenses::list).post(expenses::create))
        .route("/expenses/{id}", get(expenses::get))
        .route("/types", get(lookups::list_types).post(lookups::create_type))
        .route(
            "/locations",
            get(lookups::list_locations).post(lookups::create_location),
        )
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::Database;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    async fn app() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let app = router(ServerState::new(db, UserClock::default()));

        for (uri, description) in [
            ("/types", "Groceries"),
            ("/types", "Rent"),
            ("/locations", "Tesco"),
        ] {
            let res = app
                .clone()
                .oneshot(form("POST", uri, &format!("description={description}")))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::CREATED);
        }
        app
    }

    fn form(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json(res: axum::response::Response) -> Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn form_post_creates_expense() {
        let app = app().await;

        let res = app
            .clone()
            .oneshot(form(
                "POST",
                "/expenses",
                "date=2014-03-01+12%3A30%3A00&typeid=2&amount=12.5&locationid=1&comment=weekly+shop",
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body = json(res).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["amount"], "12.50");
        assert_eq!(body["type"]["description"], "Rent");
        assert_eq!(body["location"]["description"], "Tesco");
        assert_eq!(body["comment"], "weekly shop");
        assert_eq!(body["date"], "2014-03-01 12:30:00");

        let res = app.oneshot(get_request("/expenses/1")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json(res).await["amount"], "12.50");
    }

    #[tokio::test]
    async fn invalid_form_is_unprocessable() {
        let app = app().await;

        let res = app
            .clone()
            .oneshot(form("POST", "/expenses", "typeid=0&locationid=1&amount=1"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json(res).await["error"],
            "invalid reference: invalid typeid specified"
        );

        let res = app
            .oneshot(form("POST", "/expenses", "typeid=1&locationid=1"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_type_or_location_is_unprocessable() {
        let app = app().await;

        for (body, field) in [
            ("typeid=99&locationid=1&amount=1", "typeid"),
            ("typeid=1&locationid=99&amount=1", "locationid"),
        ] {
            let res = app
                .clone()
                .oneshot(form("POST", "/expenses", body))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(
                json(res).await["error"],
                format!("invalid reference: invalid {field} specified")
            );
        }

        let res = app.oneshot(get_request("/expenses")).await.unwrap();
        assert_eq!(json(res).await["expenses"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn unknown_expense_is_not_found() {
        let app = app().await;

        let res = app
            .clone()
            .oneshot(get_request("/expenses/9"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app.oneshot(get_request("/expenses/0")).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn list_reports_exact_total() {
        let app = app().await;
        for _ in 0..3 {
            let res = app
                .clone()
                .oneshot(form("POST", "/expenses", "typeid=1&locationid=1&amount=0.10"))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::CREATED);
        }

        let res = app.oneshot(get_request("/expenses")).await.unwrap();
        let body = json(res).await;
        assert_eq!(body["expenses"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["total"], "0.30");
    }

    #[tokio::test]
    async fn lookups_are_listed_for_select_inputs() {
        let app = app().await;

        let res = app.oneshot(get_request("/types")).await.unwrap();
        let body = json(res).await;
        assert_eq!(body[0]["id"], 1);
        assert_eq!(body[0]["description"], "Groceries");
        assert_eq!(body[1]["description"], "Rent");
    }
}
