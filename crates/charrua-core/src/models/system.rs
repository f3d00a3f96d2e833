//! System configuration and the paged response envelope

use serde::{Deserialize, Serialize};

/// Backend-wide settings exposed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguracionSistema {
    pub max_pasajes_por_compra: u32,
    #[serde(default)]
    pub minutos_expiracion_reserva: Option<u32>,
    #[serde(default)]
    pub descuento_jubilado: Option<f64>,
    #[serde(default)]
    pub descuento_estudiante: Option<f64>,
}

/// Paged list envelope returned by history endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_pages: u32,
    pub total_elements: u64,
    pub number: u32,
    pub size: u32,
    #[serde(default)]
    pub last: bool,
}

impl<T> Page<T> {
    /// Whether another page can be requested after this one
    pub fn has_more(&self) -> bool {
        self.next_index().is_some()
    }

    pub fn next_request(&self) -> Option<PageRequest> {
        self.next_index().map(|page| PageRequest {
            page,
            size: self.size,
        })
    }

    /// One based page number for display
    pub fn display_number(&self) -> u32 {
        self.number.saturating_add(1)
    }

    fn next_index(&self) -> Option<u32> {
        if self.last {
            return None;
        }
        self.number
            .checked_add(1)
            .filter(|next| *next < self.total_pages)
    }
}

/// Page index (zero based) and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn first(size: u32) -> Self {
        Self { page: 0, size }
    }

    pub fn to_query_pairs(self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ]
    }
}
