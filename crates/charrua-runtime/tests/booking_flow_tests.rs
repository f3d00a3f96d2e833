//! Integration tests for the booking controller
//!
//! Drives complete bookings against the scripted backend: trip lists per
//! leg, seat selection, checkout and the return from the payment page.

use charrua_core::models::AuthSession;
use charrua_core::{
    AppLifecycleState, BookingConfig, CharruaError, ClientConfig, DeepLinkError, HttpMethod, Leg,
    PaymentDeepLink, Screen, SearchForm, SeatNumber, TripId, TripKind, WizardStep,
};
use charrua_harness::{fixtures, MockTransport, Reply};
use charrua_runtime::{CharruaRuntime, PaymentOutcome, RuntimeBuilder, TripResults};
use serde_json::json;
use std::sync::Arc;
use tokio_test::assert_ok;

// ----------------------------------------------------------------------------
// Test Utilities
// ----------------------------------------------------------------------------

fn create_test_runtime(transport: Arc<MockTransport>, booking: BookingConfig) -> CharruaRuntime {
    let session: AuthSession = serde_json::from_value(fixtures::session_json()).unwrap();
    let mut config = ClientConfig::testing();
    config.booking = booking;
    RuntimeBuilder::new()
        .with_config(config)
        .with_transport(transport)
        .with_session(session)
        .build()
        .expect("runtime should build")
}

fn round_trip_form() -> SearchForm {
    SearchForm {
        tipo_viaje: TripKind::IdaVuelta,
        origen: fixtures::montevideo(),
        destino: fixtures::tacuarembo(),
        fecha_ida: fixtures::date(2025, 6, 1),
        fecha_vuelta: Some(fixtures::date(2025, 6, 5)),
        pasajeros: 2,
    }
}

fn seats(numbers: &[u16]) -> Vec<SeatNumber> {
    numbers.iter().copied().map(SeatNumber::new).collect()
}

/// Backend with one outbound trip (5) and one return trip (9)
fn scripted_backend() -> Arc<MockTransport> {
    let transport = Arc::new(MockTransport::new());
    let ida = fixtures::viaje(5, &fixtures::montevideo(), &fixtures::tacuarembo(), 30);
    let vuelta = fixtures::viaje(9, &fixtures::tacuarembo(), &fixtures::montevideo(), 30);
    transport
        .enqueue(HttpMethod::Get, "/viajes", Reply::ok(json!([ida])))
        .enqueue(HttpMethod::Get, "/viajes", Reply::ok(json!([vuelta])))
        .always(HttpMethod::Get, "/viajes", Reply::ok(json!([ida])))
        .always(
            HttpMethod::Get,
            "/viajes/5/asientos",
            Reply::ok(fixtures::asientos_json(40, &[1, 2])),
        )
        .always(
            HttpMethod::Post,
            "/pagos/checkout",
            Reply::ok(fixtures::checkout_json("cs_123")),
        )
        .always(
            HttpMethod::Post,
            "/pagos/confirmar",
            Reply::ok(fixtures::confirmation_json("cs_123", Some(77))),
        );
    transport
}

// ----------------------------------------------------------------------------
// Booking Flow Tests
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_complete_round_trip_booking() {
    let transport = scripted_backend();
    let runtime = create_test_runtime(transport.clone(), BookingConfig::default());
    let mut booking = runtime.booking();

    let screen = booking.start(round_trip_form()).await.unwrap();
    assert!(matches!(screen, Screen::TripList { leg: Leg::Ida, .. }));
    assert_eq!(booking.results().trips().len(), 1);

    booking.choose_trip(TripId::new(5)).unwrap();
    let seat_map = booking.seat_map().await.unwrap();
    assert!(!seat_map.is_available(SeatNumber::new(1)));
    assert!(seat_map.is_available(SeatNumber::new(12)));

    let screen = booking.confirm_seats(seats(&[12, 13])).await.unwrap();
    assert!(matches!(screen, Screen::TripList { leg: Leg::Vuelta, .. }));
    let vuelta_search = transport.requests_to(HttpMethod::Get, "/viajes")[1].clone();
    assert_eq!(vuelta_search.query_value("origenId"), Some("2"));
    assert_eq!(vuelta_search.query_value("fecha"), Some("2025-06-05"));

    booking.choose_trip(TripId::new(9)).unwrap();
    let screen = booking.confirm_seats(seats(&[3, 4])).await.unwrap();
    assert!(matches!(screen, Screen::Payment { .. }));

    let checkout = booking.begin_payment().await.unwrap();
    assert_eq!(checkout.session_id, "cs_123");
    assert!(booking.went_to_payment());
    let body = transport.last_request().unwrap().body.unwrap();
    assert_eq!(body["viajeIdaId"], 5);
    assert_eq!(body["asientosVuelta"], json!([3, 4]));
    assert_eq!(body["successUrl"], "charruabus://pago/exitoso");

    let link = PaymentDeepLink::parse("charruabus://pago/exitoso?session_id=cs_123").unwrap();
    let outcome = booking.complete_payment(&link).await.unwrap();
    match outcome {
        PaymentOutcome::Confirmed(confirmation) => {
            assert_eq!(confirmation.compra_id.map(|id| id.get()), Some(77))
        }
        other => panic!("Expected confirmed payment, got {:?}", other),
    }
    assert!(booking.state().is_none());
    assert_eq!(booking.screen(), Screen::SearchForm);
}

#[tokio::test]
async fn test_link_for_another_checkout_rejected() {
    let transport = scripted_backend();
    let runtime = create_test_runtime(transport.clone(), BookingConfig::default());
    let mut booking = runtime.booking();

    booking.start(round_trip_form()).await.unwrap();
    booking.choose_trip(TripId::new(5)).unwrap();
    booking.confirm_seats(seats(&[12, 13])).await.unwrap();
    booking.choose_trip(TripId::new(9)).unwrap();
    booking.confirm_seats(seats(&[3, 4])).await.unwrap();
    booking.begin_payment().await.unwrap();

    let stale = PaymentDeepLink::parse("charruabus://pago/exitoso?session_id=cs_old").unwrap();
    let err = booking.complete_payment(&stale).await.unwrap_err();

    assert!(matches!(
        err,
        CharruaError::DeepLink(DeepLinkError::CheckoutMismatch { .. })
    ));
    assert_eq!(transport.request_count(HttpMethod::Post, "/pagos/confirmar"), 0);
    assert_eq!(booking.checkout().map(|c| c.session_id.as_str()), Some("cs_123"));
    assert!(matches!(booking.screen(), Screen::Payment { .. }));
}

#[tokio::test]
async fn test_foreground_return_resets_wizard() {
    let transport = scripted_backend();
    let runtime = create_test_runtime(transport.clone(), BookingConfig::default());
    let mut booking = runtime.booking();

    assert_ok!(booking.start(round_trip_form()).await);
    assert_ok!(booking.choose_trip(TripId::new(5)));
    assert_ok!(booking.confirm_seats(seats(&[12, 13])).await);
    assert_ok!(booking.choose_trip(TripId::new(9)));
    assert_ok!(booking.confirm_seats(seats(&[3, 4])).await);
    assert_ok!(booking.begin_payment().await);
    let searches_before = transport.request_count(HttpMethod::Get, "/viajes");

    assert!(!booking.on_lifecycle(AppLifecycleState::Background).await.unwrap());
    assert!(booking.on_lifecycle(AppLifecycleState::Active).await.unwrap());

    let state = booking.state().unwrap();
    assert_eq!(state.current_step, WizardStep::SelectTripIda);
    for leg in [Leg::Ida, Leg::Vuelta] {
        let leg = state.leg(leg).unwrap();
        assert!(leg.trip_id.is_none());
        assert!(leg.asientos_seleccionados.is_none());
    }
    assert_eq!(
        transport.request_count(HttpMethod::Get, "/viajes"),
        searches_before + 1
    );
    assert!(!booking.went_to_payment());

    // a second foreground return without a payment visit changes nothing
    booking.on_lifecycle(AppLifecycleState::Background).await.unwrap();
    assert!(!booking.on_lifecycle(AppLifecycleState::Active).await.unwrap());
}

#[tokio::test]
async fn test_foreground_reset_can_be_disabled() {
    let transport = scripted_backend();
    let config = BookingConfig {
        reset_on_payment_return: false,
        ..BookingConfig::default()
    };
    let runtime = create_test_runtime(transport, config);
    let mut booking = runtime.booking();

    let mut form = round_trip_form();
    form.tipo_viaje = TripKind::Ida;
    form.fecha_vuelta = None;
    booking.start(form).await.unwrap();
    booking.choose_trip(TripId::new(5)).unwrap();
    booking.confirm_seats(seats(&[12, 13])).await.unwrap();
    booking.begin_payment().await.unwrap();

    booking.on_lifecycle(AppLifecycleState::Background).await.unwrap();
    assert!(!booking.on_lifecycle(AppLifecycleState::Active).await.unwrap());
    assert_eq!(booking.state().unwrap().current_step, WizardStep::Payment);
}

#[tokio::test]
async fn test_search_failure_is_retryable() {
    let transport = Arc::new(MockTransport::new());
    transport
        .enqueue(HttpMethod::Get, "/viajes", Reply::status(503))
        .always(HttpMethod::Get, "/viajes", Reply::ok(json!([])));
    let runtime = create_test_runtime(transport, BookingConfig::default());
    let mut booking = runtime.booking();

    booking.start(round_trip_form()).await.unwrap();
    assert_eq!(
        booking.results(),
        &TripResults::Failed {
            message: "Error del servidor. Intenta más tarde.".to_string(),
            retryable: true
        }
    );

    let results = booking.retry().await.unwrap();
    assert_eq!(results, &TripResults::Loaded(Vec::new()));
}

#[tokio::test]
async fn test_session_expiry_during_search_logs_out() {
    let transport = Arc::new(MockTransport::new());
    transport.always(HttpMethod::Get, "/viajes", Reply::status(401));
    let runtime = create_test_runtime(transport, BookingConfig::default());
    let mut booking = runtime.booking();

    let err = booking.start(round_trip_form()).await.unwrap_err();

    assert!(err.is_session_expired());
    assert!(!runtime.session().is_authenticated());
    assert_eq!(booking.results(), &TripResults::Idle);
}

#[tokio::test]
async fn test_back_navigation_reloads_outbound_trips() {
    let transport = scripted_backend();
    let runtime = create_test_runtime(transport.clone(), BookingConfig::default());
    let mut booking = runtime.booking();

    booking.start(round_trip_form()).await.unwrap();
    booking.choose_trip(TripId::new(5)).unwrap();
    booking.confirm_seats(seats(&[12, 13])).await.unwrap();
    assert_eq!(transport.request_count(HttpMethod::Get, "/viajes"), 2);

    // select-trip-vuelta -> select-seat-ida keeps the outbound seats
    let screen = booking.back().await.unwrap();
    match screen {
        Screen::SeatSelection { leg, preselected, .. } => {
            assert_eq!(leg, Leg::Ida);
            assert_eq!(preselected, seats(&[12, 13]));
        }
        other => panic!("Expected seat selection, got {:?}", other),
    }

    // select-seat-ida -> select-trip-ida needs the outbound list again
    booking.back().await.unwrap();
    assert_eq!(transport.request_count(HttpMethod::Get, "/viajes"), 3);
    assert!(booking.state().unwrap().viaje_ida.as_ref().unwrap().trip_id.is_none());

    assert_eq!(booking.back().await.unwrap(), Screen::SearchForm);
    assert!(booking.state().is_none());
}

#[tokio::test]
async fn test_unknown_trip_and_passenger_limit() {
    let transport = scripted_backend();
    let runtime = create_test_runtime(transport, BookingConfig::default());
    let mut booking = runtime.booking();

    booking.set_max_passengers(1);
    assert!(booking.start(round_trip_form()).await.is_err());
    assert!(booking.state().is_none());

    booking.set_max_passengers(4);
    booking.start(round_trip_form()).await.unwrap();
    assert!(booking.choose_trip(TripId::new(404)).is_err());
    assert_eq!(
        booking.state().unwrap().current_step,
        WizardStep::SelectTripIda
    );
}
