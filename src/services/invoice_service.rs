//! Invoice service - renders the invoice for an order.
//!
//! The HTML document comes from an askama template. When a PDF renderer
//! is configured the HTML is converted to PDF; if conversion fails, or no
//! renderer is configured, the same HTML is served instead.

use askama::Template;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{Config, PAYMENT_METHOD_LABEL};
use crate::domain::money::{format_money, to_money};
use crate::domain::{AddressSnapshot, OrderDetail};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{PdfConverter, UnitOfWork};

#[derive(Template)]
#[template(path = "invoice.html")]
struct InvoiceTemplate<'a> {
    app_name: &'a str,
    app_url: &'a str,
    invoice_number: &'a str,
    issued_on: String,
    short_order_id: String,
    address_lines: Vec<String>,
    payment_method: &'a str,
    rows: Vec<InvoiceRow>,
    subtotal: Amount,
    delivery_fee: Amount,
    total: Amount,
}

struct InvoiceRow {
    name: String,
    quantity: i32,
    unit_price: Amount,
    line_total: Amount,
}

/// A money cell: the bare figure for `data-amount` and the printed text.
struct Amount {
    value: String,
    display: String,
}

impl Amount {
    fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            value: to_money(amount).to_string(),
            display: format_money(amount, currency),
        }
    }
}

/// Name, URL and currency printed on invoices
#[derive(Debug, Clone)]
pub struct InvoiceBranding {
    pub app_name: String,
    pub app_url: String,
    pub currency: String,
}

impl From<&Config> for InvoiceBranding {
    fn from(config: &Config) -> Self {
        Self {
            app_name: config.app_name.clone(),
            app_url: config.app_url.clone(),
            currency: config.currency.clone(),
        }
    }
}

/// A rendered invoice ready to download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl InvoiceDocument {
    fn pdf(invoice_number: &str, body: Vec<u8>) -> Self {
        Self {
            filename: format!("invoice-{}.pdf", invoice_number),
            content_type: "application/pdf",
            body,
        }
    }

    fn html(invoice_number: &str, html: String) -> Self {
        Self {
            filename: format!("invoice-{}.html", invoice_number),
            content_type: "text/html; charset=utf-8",
            body: html.into_bytes(),
        }
    }
}

fn address_lines(address: &AddressSnapshot) -> Vec<String> {
    let mut lines = vec![match &address.building {
        Some(building) => format!("{} {}", address.street, building),
        None => address.street.clone(),
    }];
    if let Some(floor) = &address.floor {
        lines.push(format!("Floor: {}", floor));
    }
    if let Some(apartment) = &address.apartment {
        lines.push(format!("Apt: {}", apartment));
    }
    lines.push(format!("{} {}", address.postcode, address.city));
    lines
}

/// Render the invoice HTML for an order.
pub fn render_invoice_html(detail: &OrderDetail, branding: &InvoiceBranding) -> AppResult<String> {
    let order = &detail.order;
    let order_id = order.id.to_string();
    let currency = branding.currency.as_str();

    let template = InvoiceTemplate {
        app_name: &branding.app_name,
        app_url: &branding.app_url,
        invoice_number: &order.invoice_number,
        issued_on: order.created_at.format("%d %B %Y").to_string(),
        short_order_id: format!("{}...", &order_id[..8]),
        address_lines: address_lines(&order.address_snapshot),
        payment_method: PAYMENT_METHOD_LABEL,
        rows: detail
            .items
            .iter()
            .map(|item| InvoiceRow {
                name: item.product_snapshot.name.clone(),
                quantity: item.quantity,
                unit_price: Amount::new(item.price_at_purchase, currency),
                line_total: Amount::new(item.line_total, currency),
            })
            .collect(),
        subtotal: Amount::new(order.subtotal, currency),
        delivery_fee: Amount::new(order.delivery_fee, currency),
        total: Amount::new(order.total, currency),
    };

    template
        .render()
        .map_err(|e| AppError::Render(format!("invoice template: {}", e)))
}

#[async_trait]
pub trait InvoiceService: Send + Sync {
    /// Invoice for one of the customer's own orders, PDF when possible
    async fn invoice_for(&self, user_id: Uuid, order_id: Uuid) -> AppResult<InvoiceDocument>;
}

pub struct InvoiceManager<U: UnitOfWork> {
    uow: Arc<U>,
    converter: Option<Arc<dyn PdfConverter>>,
    branding: InvoiceBranding,
    storage_dir: Option<PathBuf>,
}

impl<U: UnitOfWork> InvoiceManager<U> {
    pub fn new(
        uow: Arc<U>,
        converter: Option<Arc<dyn PdfConverter>>,
        branding: InvoiceBranding,
        storage_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            uow,
            converter,
            branding,
            storage_dir,
        }
    }

    /// Keep the first PDF produced for an order on disk.
    async fn store_pdf(&self, order_id: Uuid, invoice_number: &str, pdf: &[u8]) -> AppResult<()> {
        let Some(dir) = &self.storage_dir else {
            return Ok(());
        };

        let already_stored = self
            .uow
            .orders()
            .find_invoice(order_id)
            .await?
            .and_then(|invoice| invoice.pdf_path)
            .is_some();
        if already_stored {
            return Ok(());
        }

        let path = dir.join(format!("invoice-{}.pdf", invoice_number));
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::internal(format!("invoice dir {}: {}", dir.display(), e)))?;
        tokio::fs::write(&path, pdf)
            .await
            .map_err(|e| AppError::internal(format!("invoice file {}: {}", path.display(), e)))?;

        self.uow
            .orders()
            .record_invoice_file(order_id, path.to_string_lossy().into_owned())
            .await
    }
}

#[async_trait]
impl<U: UnitOfWork> InvoiceService for InvoiceManager<U> {
    async fn invoice_for(&self, user_id: Uuid, order_id: Uuid) -> AppResult<InvoiceDocument> {
        let detail = self
            .uow
            .orders()
            .find_detail(order_id, Some(user_id))
            .await?
            .ok_or_not_found("Order")?;

        let invoice_number = detail.order.invoice_number.clone();
        let html = render_invoice_html(&detail, &self.branding)?;

        let Some(converter) = &self.converter else {
            return Ok(InvoiceDocument::html(&invoice_number, html));
        };

        match converter.convert(&html).await {
            Ok(pdf) => {
                if let Err(e) = self.store_pdf(order_id, &invoice_number, &pdf).await {
                    tracing::warn!(order_id = %order_id, error = %e, "Could not store invoice PDF");
                }
                Ok(InvoiceDocument::pdf(&invoice_number, pdf))
            }
            Err(e) => {
                tracing::warn!(order_id = %order_id, error = %e, "PDF conversion failed, serving HTML invoice");
                Ok(InvoiceDocument::html(&invoice_number, html))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Invoice, Order, OrderItem, OrderStatus, ProductSnapshot};
    use crate::infra::MockPdfConverter;
    use crate::services::test_support::{MockRepositories, TestUnitOfWork};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn branding() -> InvoiceBranding {
        InvoiceBranding {
            app_name: "Danish Grocery MVP".into(),
            app_url: "http://localhost:8000".into(),
            currency: "DKK".into(),
        }
    }

    fn item(order_id: Uuid, name: &str, quantity: i32, price: Decimal) -> OrderItem {
        OrderItem {
            id: Uuid::new_v4(),
            order_id,
            product_id: Uuid::new_v4(),
            product_snapshot: ProductSnapshot {
                name: name.into(),
                sku: "SKU".into(),
                unit: "stk".into(),
                image_url: None,
            },
            quantity,
            price_at_purchase: price,
            line_total: price * Decimal::from(quantity),
        }
    }

    fn detail() -> OrderDetail {
        let id = Uuid::from_str("3f2b8c1e-0000-4000-8000-000000000001").unwrap();
        let created_at = Utc.with_ymd_and_hms(2025, 3, 7, 10, 30, 0).unwrap();
        OrderDetail {
            order: Order {
                id,
                user_id: Uuid::new_v4(),
                address_id: Uuid::new_v4(),
                address_snapshot: AddressSnapshot {
                    id: Uuid::new_v4(),
                    label: "Home".into(),
                    street: "Østerbrogade".into(),
                    building: Some("12".into()),
                    floor: Some("3".into()),
                    apartment: None,
                    postcode: "2100".into(),
                    city: "København Ø".into(),
                    instructions: None,
                },
                status: OrderStatus::Placed,
                subtotal: Decimal::new(6240, 2),
                delivery_fee: Decimal::new(2900, 2),
                total: Decimal::new(9140, 2),
                invoice_number: "INV-2025-000042".into(),
                invoice_generated_at: Some(created_at),
                notes: None,
                created_at,
                updated_at: created_at,
            },
            items: vec![
                item(id, "Økologiske Bananer", 2, Decimal::new(2495, 2)),
                item(id, "Rugbrød & Smør", 1, Decimal::new(1250, 2)),
            ],
            history: vec![],
        }
    }

    fn amounts(html: &str) -> Vec<Decimal> {
        html.split("data-amount=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .map(|value| Decimal::from_str(value).unwrap())
            .collect()
    }

    #[test]
    fn test_rendered_figures_add_up() {
        let html = render_invoice_html(&detail(), &branding()).unwrap();
        let figures = amounts(&html);

        // unit/line pairs per item, then subtotal, delivery fee, total
        assert_eq!(figures.len(), 7);
        let line_totals = figures[1] + figures[3];
        let (subtotal, fee, total) = (figures[4], figures[5], figures[6]);

        assert_eq!(line_totals, subtotal);
        assert_eq!(subtotal + fee, total);
        assert_eq!(total.to_string(), "91.40");
    }

    #[test]
    fn test_rendered_content() {
        let html = render_invoice_html(&detail(), &branding()).unwrap();

        assert!(html.contains("INVOICE"));
        assert!(html.contains("INV-2025-000042"));
        assert!(html.contains("07 March 2025"));
        assert!(html.contains("3f2b8c1e..."));
        assert!(html.contains("Østerbrogade 12"));
        assert!(html.contains("Floor: 3"));
        assert!(!html.contains("Apt:"));
        assert!(html.contains("2100 København Ø"));
        assert!(html.contains("Cash on Delivery (COD)"));
        assert!(html.contains("<strong>91.40 DKK</strong> ready for the delivery person"));
        assert!(html.contains("Danish Grocery MVP | http:"));
        // product names are escaped
        assert!(html.contains("Rugbrød &amp; Smør"));
    }

    fn repos_with_order() -> MockRepositories {
        let mut repos = MockRepositories::default();
        repos
            .orders
            .expect_find_detail()
            .returning(|_, _| Ok(Some(detail())));
        repos
    }

    #[tokio::test]
    async fn test_html_served_without_converter() {
        let service = InvoiceManager::new(
            Arc::new(TestUnitOfWork::new(repos_with_order())),
            None,
            branding(),
            None,
        );

        let document = service.invoice_for(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
        assert_eq!(document.filename, "invoice-INV-2025-000042.html");
        assert!(document.content_type.starts_with("text/html"));
    }

    #[tokio::test]
    async fn test_pdf_served_when_converter_succeeds() {
        let mut converter = MockPdfConverter::new();
        converter
            .expect_convert()
            .returning(|_| Ok(b"%PDF-1.7".to_vec()));

        let service = InvoiceManager::new(
            Arc::new(TestUnitOfWork::new(repos_with_order())),
            Some(Arc::new(converter)),
            branding(),
            None,
        );

        let document = service.invoice_for(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
        assert_eq!(document.filename, "invoice-INV-2025-000042.pdf");
        assert_eq!(document.content_type, "application/pdf");
        assert_eq!(document.body, b"%PDF-1.7".to_vec());
    }

    #[tokio::test]
    async fn test_converter_failure_falls_back_to_identical_html() {
        let mut converter = MockPdfConverter::new();
        converter
            .expect_convert()
            .returning(|_| Err(AppError::Render("renderer down".into())));

        let service = InvoiceManager::new(
            Arc::new(TestUnitOfWork::new(repos_with_order())),
            Some(Arc::new(converter)),
            branding(),
            None,
        );

        let document = service.invoice_for(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
        let expected = render_invoice_html(&detail(), &branding()).unwrap();
        assert_eq!(document.content_type, "text/html; charset=utf-8");
        assert_eq!(document.body, expected.into_bytes());
    }

    #[tokio::test]
    async fn test_pdf_stored_and_recorded_once() {
        let dir = std::env::temp_dir().join(format!("invoices-{}", Uuid::new_v4()));
        let mut repos = repos_with_order();
        repos.orders.expect_find_invoice().returning(|order_id| {
            Ok(Some(Invoice {
                id: 1,
                order_id,
                invoice_number: "INV-2025-000042".into(),
                issued_at: Utc::now(),
                pdf_path: None,
            }))
        });
        repos
            .orders
            .expect_record_invoice_file()
            .withf(|_, path| path.ends_with("invoice-INV-2025-000042.pdf"))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut converter = MockPdfConverter::new();
        converter.expect_convert().returning(|_| Ok(b"%PDF-1.7".to_vec()));

        let service = InvoiceManager::new(
            Arc::new(TestUnitOfWork::new(repos)),
            Some(Arc::new(converter)),
            branding(),
            Some(dir.clone()),
        );

        service.invoice_for(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
        let stored = std::fs::read(dir.join("invoice-INV-2025-000042.pdf")).unwrap();
        assert_eq!(stored, b"%PDF-1.7".to_vec());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_other_customers_order_is_not_found() {
        let mut repos = MockRepositories::default();
        repos.orders.expect_find_detail().returning(|_, _| Ok(None));

        let service = InvoiceManager::new(Arc::new(TestUnitOfWork::new(repos)), None, branding(), None);
        let result = service.invoice_for(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound("Order"))));
    }
}
