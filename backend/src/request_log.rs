use std::time::Instant;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request, Response};
use tracing::{info, warn};

use crate::utils::client_addr;

/// When the request reached the fairing, kept in the request-local cache.
#[derive(Debug, Clone, Copy)]
pub struct RequestStart(pub Option<Instant>);

/// Access log: one line per response.
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request logger",
            kind: Kind::Request | Kind::Response
        }
    }

    async fn on_request(&self, req: &mut Request<'_>, _: &mut Data<'_>) {
        req.local_cache(|| RequestStart(Some(Instant::now())));
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let status = res.status();
        let client = client_addr(req);
        let elapsed_ms = req
            .local_cache(|| RequestStart(None))
            .0
            .map(|start| start.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or_default();

        if status.code >= 500 {
            warn!(%client, method = %req.method(), uri = %req.uri(), status = status.code, elapsed_ms, "request failed");
        } else {
            info!(%client, method = %req.method(), uri = %req.uri(), status = status.code, elapsed_ms, "request");
        }
    }
}

#[cfg(test)]
mod tests {
    use rocket::http::Status;
    use rocket::local::blocking::Client;
    use rocket::request::{FromRequest, Outcome};
    use rocket::{get, routes};

    use super::*;

    struct Stamped(bool);

    #[rocket::async_trait]
    impl<'r> FromRequest<'r> for Stamped {
        type Error = ();

        async fn from_request(req: &'r Request<'_>) -> Outcome<Self, ()> {
            Outcome::Success(Stamped(req.local_cache(|| RequestStart(None)).0.is_some()))
        }
    }

    #[get("/stamped")]
    fn stamped(stamp: Stamped) -> &'static str {
        if stamp.0 { "yes" } else { "no" }
    }

    #[test]
    fn test_start_time_recorded_before_routing() {
        let rocket = rocket::build().attach(RequestLogger).mount("/", routes![stamped]);
        let client = Client::tracked(rocket).expect("valid rocket instance");

        let response = client.get("/stamped").dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().as_deref(), Some("yes"));
    }

    #[test]
    fn test_unstamped_without_fairing() {
        let rocket = rocket::build().mount("/", routes![stamped]);
        let client = Client::tracked(rocket).expect("valid rocket instance");

        assert_eq!(client.get("/stamped").dispatch().into_string().as_deref(), Some("no"));
    }
}
