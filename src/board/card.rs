use crm_common::{Card, Module, Record, Stage};

use super::format::{display_date, format_currency};

const PLACEHOLDER: &str = "-";

/// Project a record into the card shown under `stage`.
pub fn to_card(record: &Record, module: Module, stage: &Stage) -> Card {
    let id = record.id();
    let (name, company, value, due_date) = match module {
        Module::Leads => (
            record
                .text("leadName")
                .or_else(|| record.text("company"))
                .unwrap_or_else(|| format!("Lead #{}", id)),
            or_placeholder(record.text("company")),
            record
                .text("leadScore")
                .map(|score| format!("Score: {}", score))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            PLACEHOLDER.to_string(),
        ),
        Module::Opportunities => (
            record
                .text("opportunityName")
                .or_else(|| record.text("accountName"))
                .unwrap_or_else(|| format!("Opportunity #{}", id)),
            or_placeholder(record.text("accountName").or_else(|| record.text("company"))),
            record
                .number("amount")
                .or_else(|| record.number("value"))
                .map(format_currency)
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            display_date(record, "expectedCloseDate"),
        ),
    };

    Card {
        id: module.card_id(&id),
        name,
        company,
        value,
        owner: or_placeholder(record.text("createdByName")),
        created_date: display_date(record, "createdOn"),
        due_date,
        status: stage.title.clone(),
        raw: record.clone(),
    }
}

fn or_placeholder(text: Option<String>) -> String {
    text.unwrap_or_else(|| PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(value: serde_json::Value) -> Record {
        Record::from_wire(value).unwrap()
    }

    #[test]
    fn test_lead_card_full() {
        let r = rec(json!({
            "id": 5,
            "leadName": "Acme",
            "company": "Acme Inc",
            "leadScore": 82,
            "createdByName": "Dana",
            "createdOn": "2024-01-05",
            "leadStatus": 1
        }));
        let card = to_card(&r, Module::Leads, &Stage::new(1, "New"));
        assert_eq!(card.id, "leads-5");
        assert_eq!(card.name, "Acme");
        assert_eq!(card.company, "Acme Inc");
        assert_eq!(card.value, "Score: 82");
        assert_eq!(card.owner, "Dana");
        assert_eq!(card.created_date, "1/5/2024");
        assert_eq!(card.due_date, "-");
        assert_eq!(card.status, "New");
        assert_eq!(card.raw, r);
    }

    #[test]
    fn test_lead_card_fallbacks() {
        let card = to_card(&rec(json!({"id": 6, "company": "Globex"})), Module::Leads, &Stage::new(1, "New"));
        assert_eq!(card.name, "Globex");

        let card = to_card(&rec(json!({"id": 7})), Module::Leads, &Stage::new(1, "New"));
        assert_eq!(card.name, "Lead #7");
        assert_eq!(card.company, "-");
        assert_eq!(card.value, "-");
        assert_eq!(card.owner, "-");
        assert_eq!(card.created_date, "-");
    }

    #[test]
    fn test_lead_due_date_is_always_placeholder() {
        let r = rec(json!({"id": 1, "expectedCloseDate": "2024-03-01"}));
        let card = to_card(&r, Module::Leads, &Stage::new(1, "New"));
        assert_eq!(card.due_date, "-");
    }

    #[test]
    fn test_opportunity_card_full() {
        let r = rec(json!({
            "id": 12,
            "opportunityName": "Renewal 2024",
            "accountName": "Initech",
            "company": "Initech LLC",
            "amount": 15000.5,
            "expectedCloseDate": "2024-06-30T00:00:00",
            "stage": 3
        }));
        let card = to_card(&r, Module::Opportunities, &Stage::new(3, "Proposal"));
        assert_eq!(card.id, "opportunities-12");
        assert_eq!(card.name, "Renewal 2024");
        assert_eq!(card.company, "Initech");
        assert_eq!(card.value, "$15,000.50");
        assert_eq!(card.due_date, "6/30/2024");
        assert_eq!(card.status, "Proposal");
    }

    #[test]
    fn test_opportunity_card_fallbacks() {
        let card = to_card(
            &rec(json!({"id": 3, "accountName": "Umbrella"})),
            Module::Opportunities,
            &Stage::new(1, "Prospecting"),
        );
        assert_eq!(card.name, "Umbrella");
        assert_eq!(card.company, "Umbrella");

        let card = to_card(
            &rec(json!({"id": 4, "company": "Hooli"})),
            Module::Opportunities,
            &Stage::new(1, "Prospecting"),
        );
        assert_eq!(card.name, "Opportunity #4");
        assert_eq!(card.company, "Hooli");
        assert_eq!(card.value, "-");
        assert_eq!(card.due_date, "-");
    }

    #[test]
    fn test_opportunity_non_finite_amount_is_placeholder() {
        let stage = Stage::new(1, "Prospecting");
        let card = to_card(&rec(json!({"id": 5, "amount": "NaN"})), Module::Opportunities, &stage);
        assert_eq!(card.value, "-");

        let card = to_card(
            &rec(json!({"id": 6, "amount": "NaN", "value": 250})),
            Module::Opportunities,
            &stage,
        );
        assert_eq!(card.value, "$250.00");
    }
}
