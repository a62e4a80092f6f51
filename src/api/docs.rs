//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::handlers::{events, me, registrations, system};

/// Aggregated OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "campus-events",
        description = "Campus event discovery and registration API"
    ),
    paths(
        system::health_handler,
        system::participation_modes_handler,
        events::list_events,
        events::create_event,
        events::get_event,
        events::change_status,
        events::update_registration,
        events::list_participants,
        registrations::register,
        me::organizer_events,
        me::my_registrations,
        me::upsert_profile,
    ),
    tags(
        (name = "System", description = "Health and static catalogs"),
        (name = "Events", description = "Event discovery and management"),
        (name = "Registrations", description = "Registration commits"),
        (name = "Me", description = "Caller-scoped views and profile"),
    )
)]
pub struct ApiDoc;
