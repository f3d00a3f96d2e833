//! Backend-shaped fixtures
//!
//! Builders for the JSON the Charrua Bus backend returns, so tests script
//! realistic responses without repeating field names.

use charrua_core::models::{Localidad, Viaje};
use charrua_core::{LocalidadId, TripId};
use chrono::NaiveDate;
use serde_json::{json, Value};

pub const TEST_TOKEN: &str = "test-token-123";

pub fn montevideo() -> Localidad {
    localidad(1, "Montevideo", "Montevideo")
}

pub fn tacuarembo() -> Localidad {
    localidad(2, "Tacuarembó", "Tacuarembó")
}

pub fn localidad(id: i64, nombre: &str, departamento: &str) -> Localidad {
    Localidad {
        id: LocalidadId::new(id),
        nombre: nombre.to_string(),
        departamento: Some(departamento.to_string()),
    }
}

pub fn localidades_json() -> Value {
    json!([
        { "id": 1, "nombre": "Montevideo", "departamento": "Montevideo" },
        { "id": 2, "nombre": "Tacuarembó", "departamento": "Tacuarembó" },
        { "id": 3, "nombre": "Salto", "departamento": "Salto" }
    ])
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}

pub fn viaje(id: i64, origen: &Localidad, destino: &Localidad, asientos: u32) -> Viaje {
    Viaje {
        id: TripId::new(id),
        origen: origen.clone(),
        destino: destino.clone(),
        fecha_salida: date(2025, 6, 1).and_hms_opt(8, 0, 0).expect("valid fixture time"),
        fecha_llegada: date(2025, 6, 1).and_hms_opt(12, 30, 0),
        precio: 850.0,
        asientos_disponibles: asientos,
        omnibus: Some("Marcopolo 42".to_string()),
        estado: Some("PROGRAMADO".to_string()),
    }
}

pub fn viaje_json(id: i64, origen: &Localidad, destino: &Localidad) -> Value {
    json!(viaje(id, origen, destino, 30))
}

pub fn asientos_json(total: u16, ocupados: &[u16]) -> Value {
    let asientos: Vec<Value> = (1..=total)
        .map(|n| json!({ "numero": n, "disponible": !ocupados.contains(&n) }))
        .collect();
    Value::Array(asientos)
}

pub fn usuario_json() -> Value {
    json!({
        "id": 7,
        "nombre": "Ana",
        "apellido": "Pereira",
        "email": "ana@example.com",
        "documento": "12345678",
        "telefono": null,
        "rol": "CLIENTE"
    })
}

pub fn session_json() -> Value {
    json!({ "token": TEST_TOKEN, "usuario": usuario_json() })
}

pub fn notificacion_json(id: i64, leida: bool) -> Value {
    json!({
        "id": id,
        "titulo": format!("Aviso {}", id),
        "mensaje": "Tu viaje sale en una hora",
        "leida": leida,
        "fecha": "2025-06-01T07:00:00",
        "tipo": "RECORDATORIO"
    })
}

/// Paged envelope as returned by list endpoints
pub fn page_json(content: Vec<Value>, number: u32, size: u32, total_elements: u64) -> Value {
    let total_pages = if size == 0 {
        0
    } else {
        ((total_elements + u64::from(size) - 1) / u64::from(size)) as u32
    };
    json!({
        "content": content,
        "totalPages": total_pages,
        "totalElements": total_elements,
        "number": number,
        "size": size,
        "last": number.saturating_add(1) >= total_pages
    })
}

pub fn checkout_json(session_id: &str) -> Value {
    json!({ "sessionId": session_id, "url": format!("https://pay.example.com/c/{}", session_id) })
}

pub fn confirmation_json(session_id: &str, compra_id: Option<i64>) -> Value {
    json!({
        "sessionId": session_id,
        "estado": if compra_id.is_some() { "PAGADO" } else { "CANCELADO" },
        "compraId": compra_id
    })
}

pub fn configuracion_json(max_pasajes: u32) -> Value {
    json!({
        "maxPasajesPorCompra": max_pasajes,
        "minutosExpiracionReserva": 10,
        "descuentoJubilado": 0.3,
        "descuentoEstudiante": 0.25
    })
}

pub fn compra_json(id: i64) -> Value {
    json!({
        "id": id,
        "fecha": "2025-05-20T10:00:00",
        "montoTotal": 1700.0,
        "estado": "PAGADA",
        "cantidadPasajes": 2,
        "pasajes": []
    })
}

pub fn pasaje_json(id: i64, asiento: u16) -> Value {
    json!({
        "id": id,
        "viaje": viaje_json(5, &montevideo(), &tacuarembo()),
        "asiento": asiento,
        "precio": 850.0,
        "estado": "CONFIRMADO",
        "fechaCompra": "2025-05-20T10:00:00"
    })
}
