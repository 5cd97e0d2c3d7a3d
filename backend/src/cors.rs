use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Request, Response};
use rocket::http::Header;

use crate::routes::AppState;

pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let Some(state) = req.rocket().state::<AppState>() else { return };
        let origin = req.headers().get_one("Origin");

        if let Some(allowed) = state.config.allowed_origins.header_value(origin) {
            if allowed != "*" {
                res.set_header(Header::new("Vary", "Origin"));
            }
            res.set_header(Header::new("Access-Control-Allow-Origin", allowed));
            res.set_header(Header::new("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"));
            res.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type, Authorization"));
            res.set_header(Header::new("Access-Control-Max-Age", "86400"));
        }
    }
}
