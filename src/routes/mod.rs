// Route exports
pub mod doctor;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(doctor::index))
        .service(web::scope("/api").configure(doctor::configure));
}
