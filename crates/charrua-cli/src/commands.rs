//! Command handlers for the Charrua CLI

use std::io::Write;

use chrono::NaiveDate;
use charrua_core::models::{
    Localidad, PageRequest, PasswordChange, ProfileUpdate, RegisterRequest, TripQuery, Viaje,
};
use charrua_core::wizard::form::parse_date;
use charrua_core::{
    ApiResult, CharruaError, Leg, LocalidadId, NotificationId, PaymentDeepLink, SearchForm, SeatNumber,
    SurfacedErrorFilter, TicketId, TripId, TripKind,
};
use charrua_runtime::{BookingController, LogoutReason, PaymentOutcome, TripResults};
use tracing::{info, warn};

use crate::app::CharruaApp;
use crate::cli::Commands;
use crate::error::{CliError, Result};

// ----------------------------------------------------------------------------
// Booking Order
// ----------------------------------------------------------------------------

/// Everything `book` needs, validated before any request is made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookOrder {
    pub origen: LocalidadId,
    pub destino: LocalidadId,
    pub ida: NaiveDate,
    pub pasajeros: u32,
    pub ida_trip: TripId,
    pub ida_seats: Vec<SeatNumber>,
    pub vuelta: Option<ReturnLeg>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnLeg {
    pub fecha: NaiveDate,
    pub trip: TripId,
    pub seats: Vec<SeatNumber>,
}

impl BookOrder {
    #[allow(clippy::too_many_arguments)]
    pub fn from_args(
        origen: i64,
        destino: i64,
        ida: &str,
        vuelta: Option<&str>,
        pasajeros: u32,
        ida_trip: i64,
        ida_seats: &str,
        vuelta_trip: Option<i64>,
        vuelta_seats: Option<&str>,
    ) -> Result<Self> {
        let vuelta = match (vuelta, vuelta_trip, vuelta_seats) {
            (None, None, None) => None,
            (Some(fecha), Some(trip), Some(seats)) => Some(ReturnLeg {
                fecha: parse_date(fecha)?,
                trip: TripId::new(trip),
                seats: SeatNumber::parse_list(seats)?,
            }),
            _ => {
                return Err(CliError::InvalidArgument(
                    "--vuelta, --vuelta-trip and --vuelta-seats go together".to_string(),
                ))
            }
        };

        Ok(Self {
            origen: LocalidadId::new(origen),
            destino: LocalidadId::new(destino),
            ida: parse_date(ida)?,
            pasajeros,
            ida_trip: TripId::new(ida_trip),
            ida_seats: SeatNumber::parse_list(ida_seats)?,
            vuelta,
        })
    }

    pub fn kind(&self) -> TripKind {
        if self.vuelta.is_some() {
            TripKind::IdaVuelta
        } else {
            TripKind::Ida
        }
    }
}

// ----------------------------------------------------------------------------
// Command Dispatcher
// ----------------------------------------------------------------------------

/// Command dispatcher for handling CLI commands
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Execute a CLI command, writing user-facing output to `out`
    pub async fn execute<W: Write>(
        command: Commands,
        app: &mut CharruaApp,
        out: &mut W,
    ) -> Result<()> {
        match command {
            Commands::Login { email, password } => {
                Self::handle_login(app, &email, &password, out).await
            }
            Commands::Logout => Self::handle_logout(app, out).await,
            Commands::Register {
                nombre,
                apellido,
                email,
                password,
                documento,
                telefono,
            } => {
                let registration = RegisterRequest {
                    nombre,
                    apellido,
                    email,
                    password,
                    documento,
                    telefono,
                };
                Self::handle_register(app, registration, out).await
            }
            Commands::Whoami => Self::handle_whoami(app, out).await,
            Commands::Profile {
                nombre,
                apellido,
                telefono,
            } => {
                let update = ProfileUpdate {
                    nombre,
                    apellido,
                    telefono,
                };
                Self::handle_profile(app, update, out).await
            }
            Commands::Password { actual, nueva } => {
                let change = PasswordChange {
                    password_actual: actual,
                    password_nueva: nueva,
                };
                app.runtime().users().change_password(&change).await?;
                writeln!(out, "Contraseña actualizada")?;
                Ok(())
            }
            Commands::Localities { prefix } => Self::handle_localities(app, prefix, out).await,
            Commands::Search {
                origen,
                destino,
                fecha,
                pasajeros,
            } => {
                let query = TripQuery {
                    origen_id: LocalidadId::new(origen),
                    destino_id: LocalidadId::new(destino),
                    fecha: parse_date(&fecha)?,
                    cantidad_pasajes: pasajeros,
                };
                Self::handle_search(app, query, out).await
            }
            Commands::Seats { trip_id } => Self::handle_seats(app, TripId::new(trip_id), out).await,
            Commands::Book {
                origen,
                destino,
                ida,
                vuelta,
                pasajeros,
                ida_trip,
                ida_seats,
                vuelta_trip,
                vuelta_seats,
            } => {
                let order = BookOrder::from_args(
                    origen,
                    destino,
                    &ida,
                    vuelta.as_deref(),
                    pasajeros,
                    ida_trip,
                    &ida_seats,
                    vuelta_trip,
                    vuelta_seats.as_deref(),
                )?;
                Self::handle_book(app, order, out).await
            }
            Commands::Pay { link } => Self::handle_pay(app, &link, out).await,
            Commands::Tickets { page } => Self::handle_tickets(app, page, out).await,
            Commands::Purchases { page } => Self::handle_purchases(app, page, out).await,
            Commands::CancelTicket { ticket_id } => {
                let id = TicketId::new(ticket_id);
                app.runtime().session().require_auth()?;
                guard(app, app.runtime().tickets().cancel_ticket(id)).await?;
                writeln!(out, "Pasaje {} cancelado", id)?;
                Ok(())
            }
            Commands::Notifications {
                watch,
                mark_all_read,
                read,
            } => Self::handle_notifications(app, watch, mark_all_read, read, out).await,
            Commands::Config => Self::handle_config(app, out).await,
        }
    }

    // ------------------------------------------------------------------------
    // Account
    // ------------------------------------------------------------------------

    async fn handle_login<W: Write>(
        app: &mut CharruaApp,
        email: &str,
        password: &str,
        out: &mut W,
    ) -> Result<()> {
        let session = app.runtime().session().login(email, password).await?;
        app.sync_session()?;
        writeln!(
            out,
            "Sesión iniciada como {} <{}>",
            session.usuario.nombre_completo(),
            session.usuario.email
        )?;
        Ok(())
    }

    async fn handle_logout<W: Write>(app: &mut CharruaApp, out: &mut W) -> Result<()> {
        let existed = app
            .runtime()
            .session()
            .logout(LogoutReason::UserRequested)
            .await;
        app.sync_session()?;
        if existed {
            writeln!(out, "Sesión cerrada")?;
        } else {
            writeln!(out, "No había una sesión activa")?;
        }
        Ok(())
    }

    async fn handle_register<W: Write>(
        app: &mut CharruaApp,
        registration: RegisterRequest,
        out: &mut W,
    ) -> Result<()> {
        let session = app.runtime().session().register(&registration).await?;
        app.sync_session()?;
        writeln!(out, "Cuenta creada para {}", session.usuario.email)?;
        Ok(())
    }

    async fn handle_whoami<W: Write>(app: &mut CharruaApp, out: &mut W) -> Result<()> {
        let runtime = app.runtime();
        runtime.session().require_auth()?;

        let (usuario, _) = futures::try_join!(
            runtime.users().refresh(),
            runtime.notifications().refresh_unread_count()
        )?;

        writeln!(out, "{} <{}>", usuario.nombre_completo(), usuario.email)?;
        if let Some(documento) = &usuario.documento {
            writeln!(out, "Documento: {}", documento)?;
        }
        if let Some(telefono) = &usuario.telefono {
            writeln!(out, "Teléfono: {}", telefono)?;
        }
        writeln!(
            out,
            "Notificaciones sin leer: {}",
            runtime.notifications().unread_count()
        )?;
        Ok(())
    }

    async fn handle_profile<W: Write>(
        app: &mut CharruaApp,
        update: ProfileUpdate,
        out: &mut W,
    ) -> Result<()> {
        let usuario = app.runtime().users().update(&update).await?;
        writeln!(out, "Perfil actualizado: {}", usuario.nombre_completo())?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------------

    async fn handle_localities<W: Write>(
        app: &mut CharruaApp,
        prefix: Option<String>,
        out: &mut W,
    ) -> Result<()> {
        let locations = app.runtime().locations();
        let localidades = match prefix.as_deref() {
            Some(prefix) => guard(app, locations.search(prefix)).await?,
            None => guard(app, locations.list()).await?,
        };

        if localidades.is_empty() {
            writeln!(out, "No se encontraron localidades")?;
        }
        for localidad in &localidades {
            writeln!(out, "{:>4}  {}", localidad.id, format_localidad(localidad))?;
        }
        Ok(())
    }

    async fn handle_search<W: Write>(
        app: &mut CharruaApp,
        query: TripQuery,
        out: &mut W,
    ) -> Result<()> {
        let trips = guard(app, app.runtime().trips().search(&query)).await?;
        write_trips(out, &trips)
    }

    async fn handle_seats<W: Write>(app: &mut CharruaApp, trip_id: TripId, out: &mut W) -> Result<()> {
        let map = guard(app, app.runtime().trips().seats(trip_id)).await?;
        let available: Vec<String> = map.available().map(|s| s.to_string()).collect();
        writeln!(
            out,
            "Viaje {}: {} de {} asientos libres",
            map.viaje_id,
            available.len(),
            map.asientos.len()
        )?;
        if !available.is_empty() {
            writeln!(out, "{}", available.join(" "))?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Booking
    // ------------------------------------------------------------------------

    async fn handle_book<W: Write>(app: &mut CharruaApp, order: BookOrder, out: &mut W) -> Result<()> {
        app.runtime().session().require_auth()?;

        let localidades = guard(app, app.runtime().locations().list()).await?;
        let origen = find_localidad(&localidades, order.origen)?;
        let destino = find_localidad(&localidades, order.destino)?;

        let mut booking = app.runtime().booking();
        match app.runtime().load_system_config().await {
            Ok(system) => booking.set_max_passengers(system.max_pasajes_por_compra),
            Err(e) if e.is_session_expired() => return Err(e.into()),
            Err(e) => warn!(error = %e, "using local passenger limit"),
        }

        let form = SearchForm {
            tipo_viaje: order.kind(),
            origen,
            destino,
            fecha_ida: order.ida,
            fecha_vuelta: order.vuelta.as_ref().map(|v| v.fecha),
            pasajeros: order.pasajeros,
        };
        booking.start(form).await?;

        Self::pick_leg(&mut booking, Leg::Ida, order.ida_trip, order.ida_seats, out).await?;
        if let Some(vuelta) = order.vuelta {
            Self::pick_leg(&mut booking, Leg::Vuelta, vuelta.trip, vuelta.seats, out).await?;
        }

        let checkout = booking.begin_payment().await?;
        info!(session_id = %checkout.session_id, "checkout ready");
        writeln!(out, "Completá el pago en: {}", checkout.url)?;
        writeln!(out, "Sesión de pago: {}", checkout.session_id)?;
        writeln!(
            out,
            "Al volver, ejecutá `charrua pay \"{}\"`",
            PaymentDeepLink::Success {
                session_id: checkout.session_id.clone()
            }
            .to_url()
        )?;
        Ok(())
    }

    async fn pick_leg<W: Write>(
        booking: &mut BookingController,
        leg: Leg,
        trip: TripId,
        seats: Vec<SeatNumber>,
        out: &mut W,
    ) -> Result<()> {
        ensure_trips_loaded(booking).await?;
        booking.choose_trip(trip)?;

        let map = booking.seat_map().await?;
        let taken = map.unavailable_in(&seats);
        if !taken.is_empty() {
            return Err(CliError::Booking(format!(
                "Asientos no disponibles en el viaje {}: {}",
                trip,
                join(taken)
            )));
        }

        writeln!(out, "{}: viaje {}, asientos {}", leg, trip, join(&seats))?;
        booking.confirm_seats(seats).await?;
        Ok(())
    }

    async fn handle_pay<W: Write>(app: &mut CharruaApp, link: &str, out: &mut W) -> Result<()> {
        let link = PaymentDeepLink::parse(link)?;
        let mut booking = app.runtime().booking();

        match booking.complete_payment(&link).await? {
            PaymentOutcome::Confirmed(confirmation) => match confirmation.compra_id {
                Some(compra) => writeln!(out, "Pago confirmado. Compra {}", compra)?,
                None => writeln!(out, "Pago confirmado ({})", confirmation.estado)?,
            },
            PaymentOutcome::Cancelled(confirmation) => {
                writeln!(out, "Pago cancelado ({})", confirmation.estado)?
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------------

    async fn handle_tickets<W: Write>(app: &mut CharruaApp, page: u32, out: &mut W) -> Result<()> {
        app.runtime().session().require_auth()?;
        let request = PageRequest {
            page,
            size: app.config().polling.page_size,
        };
        let tickets = guard(app, app.runtime().tickets().my_tickets(request)).await?;

        for pasaje in &tickets.content {
            writeln!(
                out,
                "{:>5}  {}  asiento {:>2}  {:<10}  {}",
                pasaje.id,
                format_route(&pasaje.viaje),
                pasaje.asiento,
                pasaje.estado,
                pasaje.viaje.fecha_salida.format("%d/%m/%Y %H:%M")
            )?;
        }
        writeln!(
            out,
            "Página {} de {} ({} pasajes)",
            tickets.display_number(),
            tickets.total_pages.max(1),
            tickets.total_elements
        )?;
        Ok(())
    }

    async fn handle_purchases<W: Write>(app: &mut CharruaApp, page: u32, out: &mut W) -> Result<()> {
        app.runtime().session().require_auth()?;
        let request = PageRequest {
            page,
            size: app.config().polling.page_size,
        };
        let purchases = guard(app, app.runtime().tickets().my_purchases(request)).await?;

        for compra in &purchases.content {
            writeln!(
                out,
                "{:>5}  {}  {:>3} pasajes  ${:.2}  {}",
                compra.id,
                compra.fecha.format("%d/%m/%Y"),
                compra.cantidad_pasajes,
                compra.monto_total,
                compra.estado
            )?;
        }
        writeln!(
            out,
            "Página {} de {} ({} compras)",
            purchases.display_number(),
            purchases.total_pages.max(1),
            purchases.total_elements
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    async fn handle_notifications<W: Write>(
        app: &mut CharruaApp,
        watch: bool,
        mark_all_read: bool,
        read: Option<i64>,
        out: &mut W,
    ) -> Result<()> {
        app.runtime().session().require_auth()?;
        let center = app.runtime().notifications().clone();

        if mark_all_read {
            center.mark_all_read().await?;
            writeln!(out, "Todas las notificaciones marcadas como leídas")?;
        } else if let Some(id) = read {
            center.mark_read(NotificationId::new(id)).await?;
        }

        center.refresh_notifications().await?;
        center.refresh_unread_count().await?;

        for notificacion in center.notifications() {
            let marker = if notificacion.leida { ' ' } else { '*' };
            writeln!(
                out,
                "{} {:>4}  {}  {}: {}",
                marker,
                notificacion.id,
                notificacion.fecha.format("%d/%m %H:%M"),
                notificacion.titulo,
                notificacion.mensaje
            )?;
        }
        writeln!(out, "Sin leer: {}", center.unread_count())?;

        if watch {
            Self::watch_unread(app, out).await?;
        }
        Ok(())
    }

    /// Follow the unread counter until Ctrl-C
    async fn watch_unread<W: Write>(app: &mut CharruaApp, out: &mut W) -> Result<()> {
        app.runtime_mut().start_notification_poller()?;
        let mut unread = app.runtime().notifications().subscribe_unread();
        info!("Watching notifications, press Ctrl-C to stop");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                changed = unread.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let count = *unread.borrow_and_update();
                    writeln!(out, "Sin leer: {}", count)?;
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    async fn handle_config<W: Write>(app: &mut CharruaApp, out: &mut W) -> Result<()> {
        let rendered = toml::to_string_pretty(app.config())
            .map_err(|e| CliError::Config(format!("Failed to render config: {}", e)))?;
        writeln!(out, "{}", rendered.trim_end())?;

        match app.runtime().load_system_config().await {
            Ok(system) => {
                writeln!(out)?;
                writeln!(out, "Máximo de pasajes por compra: {}", system.max_pasajes_por_compra)?;
                if let Some(minutos) = system.minutos_expiracion_reserva {
                    writeln!(out, "Las reservas expiran a los {} minutos", minutos)?;
                }
            }
            Err(e) => warn!(error = %e, "backend configuration unavailable"),
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Error Reporting
// ----------------------------------------------------------------------------

/// Message to print for errors the user already knows how to read.
/// `None` means the error is unexpected and should be logged instead.
pub fn surfaced_message(filter: &SurfacedErrorFilter, err: &CliError) -> Option<String> {
    let message = err.to_string();
    if err.is_session_expired() {
        return Some(format!("{}. Ejecutá `charrua login` para continuar.", message));
    }
    let user_facing = match err {
        CliError::Charrua(CharruaError::Configuration { .. } | CharruaError::Channel { .. }) => {
            false
        }
        CliError::Charrua(_) | CliError::Booking(_) | CliError::InvalidArgument(_) => true,
        _ => false,
    };
    (user_facing || filter.should_suppress(&message)).then_some(message)
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

async fn guard<T, F>(app: &CharruaApp, call: F) -> Result<T>
where
    F: std::future::Future<Output = ApiResult<T>>,
{
    Ok(app.runtime().session().guard(call).await?)
}

/// Trip list for the active leg, retrying once when the failure allows it
async fn ensure_trips_loaded(booking: &mut BookingController) -> Result<()> {
    if matches!(booking.results(), TripResults::Failed { retryable: true, .. }) {
        booking.retry().await?;
    }
    match booking.results() {
        TripResults::Failed { message, .. } => Err(CliError::Booking(message.clone())),
        _ => Ok(()),
    }
}

fn find_localidad(localidades: &[Localidad], id: LocalidadId) -> Result<Localidad> {
    localidades
        .iter()
        .find(|l| l.id == id)
        .cloned()
        .ok_or_else(|| CliError::InvalidArgument(format!("Localidad desconocida: {}", id)))
}

fn format_localidad(localidad: &Localidad) -> String {
    match &localidad.departamento {
        Some(departamento) if departamento != &localidad.nombre => {
            format!("{} ({})", localidad.nombre, departamento)
        }
        _ => localidad.nombre.clone(),
    }
}

fn format_route(viaje: &Viaje) -> String {
    format!("{} -> {}", viaje.origen.nombre, viaje.destino.nombre)
}

fn write_trips<W: Write>(out: &mut W, trips: &[Viaje]) -> Result<()> {
    if trips.is_empty() {
        writeln!(out, "No hay viajes para esa búsqueda")?;
        return Ok(());
    }
    for viaje in trips {
        writeln!(
            out,
            "{:>5}  {}  {}  ${:.2}  {} libres",
            viaje.id,
            viaje.fecha_salida.format("%d/%m/%Y %H:%M"),
            format_route(viaje),
            viaje.precio,
            viaje.asientos_disponibles
        )?;
    }
    Ok(())
}

fn join<T: std::fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
