// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    models::{
        auth::User,
        wallet::{PayableLedger, WalletSummary},
    },
};

const FONT_FAMILY: &str = "Roboto";

fn document_error(e: impl std::fmt::Display) -> AppError {
    AppError::DocumentError(e.to_string())
}

/// Link de pagamento UPI lido pelo QR do extrato.
pub fn upi_uri(upi_id: &str, payee_name: &str, amount: Decimal) -> Result<String, AppError> {
    let mut uri = reqwest::Url::parse("upi://pay").map_err(document_error)?;
    uri.query_pairs_mut()
        .append_pair("pa", upi_id)
        .append_pair("pn", payee_name)
        .append_pair("am", &format!("{:.2}", amount.max(Decimal::ZERO)));
    Ok(uri.into())
}

#[derive(Clone)]
pub struct DocumentService {
    font_dir: String,
}

impl DocumentService {
    pub fn new(font_dir: String) -> Self {
        Self { font_dir }
    }

    /// Extrato de comissões do parceiro, renderizado em memória.
    pub fn earning_statement_pdf(
        &self,
        partner: &User,
        ledger: &PayableLedger,
        wallet: &WalletSummary,
    ) -> Result<Vec<u8>, AppError> {
        // Carrega a fonte da pasta configurada
        let font_family = genpdf::fonts::from_files(&self.font_dir, FONT_FAMILY, None).map_err(|_| {
            AppError::DocumentError(format!("Fonte {} não encontrada em {}", FONT_FAMILY, self.font_dir))
        })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Earning statement - {}", partner.full_name));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new("EARNING STATEMENT")
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Generated on {}",
            chrono::Utc::now().format("%d/%m/%Y")
        )));
        doc.push(elements::Break::new(1.5));

        // --- PARCEIRO ---
        doc.push(elements::Paragraph::new(format!("Partner: {}", partner.full_name)).styled(style::Style::new().bold()));
        doc.push(elements::Paragraph::new(format!("Role: {:?}", partner.role)));
        doc.push(elements::Paragraph::new(format!("E-mail: {}", partner.email)));
        if let Some(phone) = &partner.phone {
            doc.push(elements::Paragraph::new(format!("Phone: {}", phone)));
        }
        doc.push(elements::Break::new(2));

        // --- TABELA DE NEGÓCIOS ---
        // Pesos: Data (2), Imóvel (4), Valor (2), Regra (2), Comissão (2)
        let mut table = elements::TableLayout::new(vec![2, 4, 2, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Date").styled(style_bold))
            .element(elements::Paragraph::new("Property").styled(style_bold))
            .element(elements::Paragraph::new("Deal value").styled(style_bold))
            .element(elements::Paragraph::new("Rule").styled(style_bold))
            .element(elements::Paragraph::new("Earning").styled(style_bold))
            .push()
            .map_err(document_error)?;

        for entry in &ledger.entries {
            table
                .row()
                .element(elements::Paragraph::new(entry.deal_date.format("%d/%m/%Y").to_string()))
                .element(elements::Paragraph::new(entry.property.title.clone()))
                .element(elements::Paragraph::new(format!("₹ {:.2}", entry.deal_value)))
                .element(elements::Paragraph::new(format!(
                    "{:?} {}",
                    entry.earning_rule.rule_type, entry.earning_rule.value
                )))
                .element(elements::Paragraph::new(format!("₹ {:.2}", entry.earning_amount)))
                .push()
                .map_err(document_error)?;
        }

        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- TOTAIS ---
        for (label, amount) in [
            ("Total earned", wallet.total_earned),
            ("Withdrawn", wallet.withdrawn),
            ("Pending withdrawals", wallet.pending_withdrawals),
            ("Available balance", wallet.available_balance),
        ] {
            let mut line = elements::Paragraph::new(format!("{}: ₹ {:.2}", label, amount));
            line.set_alignment(genpdf::Alignment::Right);
            doc.push(line.styled(style::Style::new().bold().with_font_size(11)));
        }
        if wallet.reward_points > Decimal::ZERO {
            let mut points = elements::Paragraph::new(format!("Reward points: {}", wallet.reward_points));
            points.set_alignment(genpdf::Alignment::Right);
            doc.push(points);
        }

        // --- QR CODE UPI ---
        if let Some(upi_id) = &partner.upi_id {
            doc.push(elements::Break::new(2));
            doc.push(
                elements::Paragraph::new("PAYOUT VIA UPI")
                    .styled(style::Style::new().bold().with_font_size(12)),
            );
            doc.push(elements::Paragraph::new(format!("UPI ID: {}", upi_id)));
            doc.push(elements::Break::new(1));

            let uri = upi_uri(upi_id, &partner.full_name, wallet.available_balance)?;
            let code = QrCode::new(uri.as_bytes()).map_err(document_error)?;

            let image_buffer = code.render::<Luma<u8>>().build();
            let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

            let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
                .map_err(document_error)?
                .with_scale(genpdf::Scale::new(0.5, 0.5));

            doc.push(pdf_image);
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(document_error)?;

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{PaymentStatus, UserRole, UserStatus};

    #[test]
    fn upi_link_encodes_name_and_formats_amount() {
        let uri = upi_uri("ravi@okaxis", "Ravi Kumar", Decimal::new(5000050, 2)).unwrap();
        assert_eq!(uri, "upi://pay?pa=ravi%40okaxis&pn=Ravi+Kumar&am=50000.50");
    }

    #[test]
    fn reserved_characters_in_the_name_cannot_inject_parameters() {
        let uri = upi_uri("a@upi", "Sharma & Sons=1", Decimal::ONE).unwrap();
        assert_eq!(uri, "upi://pay?pa=a%40upi&pn=Sharma+%26+Sons%3D1&am=1.00");

        let parsed = reqwest::Url::parse(&uri).unwrap();
        let pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[1], ("pn".to_string(), "Sharma & Sons=1".to_string()));
    }

    #[test]
    fn negative_balance_is_shown_as_zero() {
        let uri = upi_uri("a@upi", "A", Decimal::from(-10)).unwrap();
        assert!(uri.ends_with("&am=0.00"));
    }

    #[test]
    fn missing_fonts_are_a_document_error() {
        let service = DocumentService::new("/nonexistent/fonts".into());
        let partner = User {
            id: uuid::Uuid::new_v4(),
            email: "ravi@example.in".into(),
            password_hash: String::new(),
            full_name: "Ravi Kumar".into(),
            phone: None,
            role: UserRole::Affiliate,
            status: UserStatus::Active,
            payment_status: PaymentStatus::Unpaid,
            upi_id: Some("ravi@okaxis".into()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let wallet = crate::services::wallet_service::compute_wallet(
            partner.id,
            Decimal::ZERO,
            Decimal::ZERO,
            Default::default(),
        );

        let err = service
            .earning_statement_pdf(&partner, &PayableLedger::new(Vec::new()), &wallet)
            .unwrap_err();
        assert!(matches!(err, AppError::DocumentError(_)));
    }
}
