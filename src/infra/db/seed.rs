//! Development seed data: the Copenhagen service area and a sample catalog.
//!
//! Every insert is `ON CONFLICT DO NOTHING` on the natural key, so seeding
//! can be repeated without touching rows that already exist.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::infra::repositories::entities::{category, product, service_postcode};

/// (postcode, city, delivery fee in kroner, minimum order in kroner)
const POSTCODES: &[(&str, &str, i64, i64)] = &[
    ("1000", "København K", 0, 200),
    ("1050", "København K", 0, 200),
    ("1100", "København K", 0, 200),
    ("1150", "København K", 0, 200),
    ("1200", "København K", 0, 200),
    ("1250", "København K", 0, 200),
    ("1300", "København K", 0, 200),
    ("1350", "København K", 0, 200),
    ("1400", "København K", 0, 200),
    ("1450", "København K", 0, 200),
    ("1500", "København V", 0, 200),
    ("1550", "København V", 0, 200),
    ("1600", "København V", 0, 200),
    ("1650", "København V", 0, 200),
    ("1700", "København V", 0, 200),
    ("1750", "København V", 0, 200),
    ("1800", "Frederiksberg C", 0, 200),
    ("1850", "Frederiksberg C", 0, 200),
    ("1900", "Frederiksberg C", 0, 200),
    ("1950", "Frederiksberg C", 0, 200),
    ("2000", "Frederiksberg", 0, 200),
    ("2100", "København Ø", 0, 200),
    ("2200", "København N", 0, 200),
    ("2300", "København S", 0, 200),
    ("2400", "København NV", 0, 200),
    ("2500", "Valby", 0, 200),
    ("2700", "Brønshøj", 0, 200),
    ("2720", "Vanløse", 0, 200),
    ("2770", "Kastrup", 29, 250),
    ("2820", "Gentofte", 29, 250),
    ("2900", "Hellerup", 29, 250),
    ("2920", "Charlottenlund", 29, 250),
];

/// (name, slug, sort order)
const CATEGORIES: &[(&str, &str, i32)] = &[
    ("Frugt & Grønt", "frugt-gront", 1),
    ("Mejeriprodukter", "mejeri", 2),
    ("Brød & Bagværk", "brod-bagvaerk", 3),
    ("Kød & Fjerkræ", "kod-fjerkrae", 4),
    ("Kolonial", "kolonial", 5),
    ("Drikkevarer", "drikkevarer", 6),
    ("Frost", "frost", 7),
    ("Snacks & Slik", "snacks-slik", 8),
];

struct SampleProduct {
    name: &'static str,
    slug: &'static str,
    category: &'static str,
    /// Price in øre
    price: i64,
    unit: &'static str,
    featured: bool,
    description: &'static str,
}

const fn sample(
    name: &'static str,
    slug: &'static str,
    category: &'static str,
    price: i64,
    unit: &'static str,
    featured: bool,
    description: &'static str,
) -> SampleProduct {
    SampleProduct {
        name,
        slug,
        category,
        price,
        unit,
        featured,
        description,
    }
}

const PRODUCTS: &[SampleProduct] = &[
    sample("Økologiske Bananer", "oko-bananer", "frugt-gront", 2495, "bundt", true, "Økologiske bananer fra Ecuador."),
    sample("Danske Æbler", "danske-aebler", "frugt-gront", 1995, "pose", false, "Sprøde danske æbler fra Fyn. Pose med ca. 6 stk."),
    sample("Avocado", "avocado", "frugt-gront", 1295, "stk", true, "Modne avocadoer klar til at spise."),
    sample("Cherry Tomater", "cherry-tomater", "frugt-gront", 2200, "bakke", false, "Søde cherrytomater. 250g bakke."),
    sample("Kartofler", "kartofler", "frugt-gront", 1800, "kg", false, "Danske kartofler. Ca. 2 kg."),
    sample("Letmælk 1.5%", "letmaelk", "mejeri", 1250, "liter", true, "Letmælk 1.5% fedt. 1 liter karton."),
    sample("Skyr Naturel", "skyr-naturel", "mejeri", 1800, "bøtte", false, "Skyr uden tilsat sukker. 450g bøtte."),
    sample("Smør", "smor", "mejeri", 3200, "stk", true, "Klassisk dansk smør. 200g pakke."),
    sample("Æg Økologiske", "aeg-oko", "mejeri", 4200, "bakke", false, "10 stk økologiske æg fra fritgående høns."),
    sample("Rugbrød", "rugbrod", "brod-bagvaerk", 2800, "stk", true, "Klassisk dansk rugbrød med solsikkekerner."),
    sample("Franskbrød", "franskbrod", "brod-bagvaerk", 2200, "stk", false, "Friskbagt franskbrød med sprød skorpe."),
    sample("Hakket Oksekød 8-12%", "hakket-oksekod", "kod-fjerkrae", 5500, "pakke", true, "Dansk hakket oksekød. 500g pakke."),
    sample("Kyllingebryst", "kyllingebryst", "kod-fjerkrae", 7500, "pakke", true, "Dansk kyllingebryst uden skind. Ca. 500g."),
    sample("Pasta Spaghetti", "pasta-spaghetti", "kolonial", 1200, "pakke", false, "Italiensk spaghetti. 500g pakke."),
    sample("Hakkede Tomater", "hakkede-tomater", "kolonial", 1000, "dåse", false, "Hakkede tomater. 400g dåse."),
    sample("Olivenolie Extra Virgin", "olivenolie", "kolonial", 6500, "flaske", true, "Koldpresset olivenolie. 500ml."),
    sample("Kaffe", "kaffe", "drikkevarer", 4500, "pose", true, "Malet filterkaffe. 400g pose."),
    sample("Kildevand", "kildevand", "drikkevarer", 800, "flaske", false, "Dansk kildevand. 1.5 liter flaske."),
    sample("Frosne Ærter", "frost-aerter", "frost", 1800, "pose", false, "Frosne grønne ærter. 450g pose."),
    sample("Is Vanilje", "is-vanilje", "frost", 3500, "bøtte", true, "Is med vaniljesmag. 500ml bøtte."),
    sample("Nøddemix", "noddemix", "snacks-slik", 4000, "pose", false, "Blanding af ristede nødder. 200g pose."),
];

/// Insert the service-area postcodes. Returns how many were new.
pub async fn seed_postcodes<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    let now = Utc::now();
    let mut inserted = 0;

    for &(postcode, city, fee, minimum) in POSTCODES {
        let model = service_postcode::ActiveModel {
            id: Set(Uuid::new_v4()),
            postcode: Set(postcode.to_string()),
            city: Set(city.to_string()),
            is_active: Set(true),
            delivery_fee: Set(Decimal::from(fee)),
            min_order_amount: Set(Decimal::from(minimum)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        inserted += service_postcode::Entity::insert(model)
            .on_conflict(
                OnConflict::column(service_postcode::Column::Postcode)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
    }

    Ok(inserted)
}

/// Insert the sample categories and products. Returns how many products were new.
pub async fn seed_catalog<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    let now = Utc::now();

    for &(name, slug, sort_order) in CATEGORIES {
        let model = category::ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            parent_id: Set(None),
            sort_order: Set(sort_order),
            is_active: Set(true),
            image_url: Set(None),
            created_at: Set(now),
            ..Default::default()
        };

        category::Entity::insert(model)
            .on_conflict(
                OnConflict::column(category::Column::Slug)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
    }

    let slugs: Vec<&str> = CATEGORIES.iter().map(|(_, slug, _)| *slug).collect();
    let category_ids: HashMap<String, i32> = category::Entity::find()
        .filter(category::Column::Slug.is_in(slugs))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.slug, c.id))
        .collect();

    let mut inserted = 0;
    for sample in PRODUCTS {
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(sample.slug.to_uppercase()),
            name: Set(sample.name.to_string()),
            slug: Set(sample.slug.to_string()),
            description: Set(Some(sample.description.to_string())),
            price: Set(Decimal::new(sample.price, 2)),
            unit: Set(sample.unit.to_string()),
            unit_quantity: Set(Decimal::new(1000, 3)),
            image_url: Set(None),
            category_id: Set(category_ids.get(sample.category).copied()),
            is_active: Set(true),
            is_featured: Set(sample.featured),
            created_at: Set(now),
            updated_at: Set(now),
        };

        inserted += product::Entity::insert(model)
            .on_conflict(
                OnConflict::column(product::Column::Slug)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_keys_are_unique() {
        let postcodes: HashSet<_> = POSTCODES.iter().map(|p| p.0).collect();
        assert_eq!(postcodes.len(), POSTCODES.len());

        let slugs: HashSet<_> = PRODUCTS.iter().map(|p| p.slug).collect();
        assert_eq!(slugs.len(), PRODUCTS.len());
    }

    #[test]
    fn test_every_sample_product_has_a_category() {
        let categories: HashSet<_> = CATEGORIES.iter().map(|c| c.1).collect();
        for sample in PRODUCTS {
            assert!(categories.contains(sample.category), "{}", sample.slug);
            assert!(sample.price > 0);
        }
    }
}
