//! Sample catalog data for development and staging.
//!
//! # Usage
//!
//! ```bash
//! # Insert whatever is missing
//! ap-cli seed
//!
//! # Empty the catalog tables first
//! ap-cli seed --reset
//! ```
//!
//! Rows are matched on their natural keys (category slug, product SKU,
//! slide title, coupon code), so running the seed twice inserts nothing
//! the second time.

use autopecas_core::CategoryId;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::error::{CliError, is_duplicate_error};

/// Tables emptied by `--reset`, children first.
const RESET_SQL: &str = "TRUNCATE order_items, payments, orders, cart_items, carts, coupons, \
                         slides, products, categories RESTART IDENTITY CASCADE";

struct SeedCategory {
    slug: &'static str,
    name: &'static str,
    description: &'static str,
}

struct SeedProduct {
    sku: &'static str,
    name: &'static str,
    category: &'static str,
    brand: &'static str,
    /// Centavos.
    price: i64,
    discount: Option<i64>,
    stock: i32,
    /// Grams.
    weight: i64,
    featured: bool,
}

struct SeedSlide {
    title: &'static str,
    subtitle: &'static str,
    image_url: &'static str,
    link_url: &'static str,
}

const CATEGORIES: &[SeedCategory] = &[
    SeedCategory {
        slug: "freios",
        name: "Freios",
        description: "Pastilhas, discos e fluidos de freio",
    },
    SeedCategory {
        slug: "suspensao",
        name: "Suspensão",
        description: "Amortecedores, molas e bandejas",
    },
    SeedCategory {
        slug: "motor",
        name: "Motor",
        description: "Filtros, velas, correias e óleos",
    },
    SeedCategory {
        slug: "eletrica",
        name: "Elétrica",
        description: "Baterias, lâmpadas e alternadores",
    },
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        sku: "FRE-PAS-001",
        name: "Pastilha de Freio Dianteira Cerâmica",
        category: "freios",
        brand: "Cobreq",
        price: 18_990,
        discount: Some(15_990),
        stock: 40,
        weight: 900,
        featured: true,
    },
    SeedProduct {
        sku: "FRE-DIS-002",
        name: "Disco de Freio Ventilado (par)",
        category: "freios",
        brand: "Fremax",
        price: 42_900,
        discount: None,
        stock: 12,
        weight: 9_800,
        featured: false,
    },
    SeedProduct {
        sku: "SUS-AMO-001",
        name: "Amortecedor Dianteiro Pressurizado",
        category: "suspensao",
        brand: "Monroe",
        price: 38_900,
        discount: Some(34_900),
        stock: 16,
        weight: 3_200,
        featured: true,
    },
    SeedProduct {
        sku: "MOT-FIL-001",
        name: "Filtro de Óleo",
        category: "motor",
        brand: "Tecfil",
        price: 3_290,
        discount: None,
        stock: 150,
        weight: 350,
        featured: false,
    },
    SeedProduct {
        sku: "MOT-VEL-002",
        name: "Jogo de Velas de Ignição Iridium",
        category: "motor",
        brand: "NGK",
        price: 27_990,
        discount: Some(23_990),
        stock: 25,
        weight: 250,
        featured: true,
    },
    SeedProduct {
        sku: "ELE-BAT-001",
        name: "Bateria 60Ah Selada",
        category: "eletrica",
        brand: "Moura",
        price: 54_900,
        discount: None,
        stock: 8,
        weight: 14_500,
        featured: false,
    },
];

const SLIDES: &[SeedSlide] = &[
    SeedSlide {
        title: "Semana do Freio",
        subtitle: "Até 20% de desconto em pastilhas e discos",
        image_url: "/uploads/slides/semana-do-freio.jpg",
        link_url: "/categorias/freios",
    },
    SeedSlide {
        title: "Frete grátis acima de R$ 299",
        subtitle: "Para todo o Brasil",
        image_url: "/uploads/slides/frete-gratis.jpg",
        link_url: "/produtos",
    },
];

/// Rows inserted by a seed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: u64,
    pub products: u64,
    pub slides: u64,
    pub coupons: u64,
}

/// Insert the sample data.
///
/// # Errors
///
/// Returns an error if a statement fails for any reason other than a
/// duplicate row.
pub async fn run(pool: &PgPool, reset: bool) -> Result<SeedSummary, CliError> {
    if reset {
        warn!("Truncating catalog, cart and order tables");
        sqlx::raw_sql(RESET_SQL).execute(pool).await?;
    }

    let mut summary = SeedSummary::default();

    for category in CATEGORIES {
        let inserted = sqlx::query(
            "INSERT INTO categories (name, slug, description) VALUES ($1, $2, $3) \
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(category.name)
        .bind(category.slug)
        .bind(category.description)
        .execute(pool)
        .await?;
        summary.categories += inserted.rows_affected();
    }
    info!(inserted = summary.categories, "Categories seeded");

    for product in PRODUCTS {
        let Some(category_id) = category_id(pool, product.category).await? else {
            warn!(sku = product.sku, category = product.category, "Category missing, skipping product");
            continue;
        };

        let inserted = sqlx::query(
            "INSERT INTO products \
             (name, slug, sku, original_price, discount_price, stock, brand, category_id, weight, featured) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (sku) DO NOTHING",
        )
        .bind(product.name)
        .bind(slugify(product.name))
        .bind(product.sku)
        .bind(Decimal::new(product.price, 2))
        .bind(product.discount.map(|centavos| Decimal::new(centavos, 2)))
        .bind(product.stock)
        .bind(product.brand)
        .bind(category_id)
        .bind(Decimal::new(product.weight, 3))
        .bind(product.featured)
        .execute(pool)
        .await;

        match inserted {
            Ok(result) => summary.products += result.rows_affected(),
            // A product with the same name but another SKU collides on slug.
            Err(e) if is_duplicate_error(&e) => {
                warn!(sku = product.sku, error = %e, "Product already present, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }
    info!(inserted = summary.products, "Products seeded");

    for (position, slide) in (0_i32..).zip(SLIDES) {
        let inserted = sqlx::query(
            "INSERT INTO slides (title, subtitle, image_url, link_url, position) \
             SELECT $1, $2, $3, $4, $5 \
             WHERE NOT EXISTS (SELECT 1 FROM slides WHERE title = $1)",
        )
        .bind(slide.title)
        .bind(slide.subtitle)
        .bind(slide.image_url)
        .bind(slide.link_url)
        .bind(position)
        .execute(pool)
        .await?;
        summary.slides += inserted.rows_affected();
    }
    info!(inserted = summary.slides, "Slides seeded");

    let inserted = sqlx::query(
        "INSERT INTO coupons (code, discount_type, discount_value, min_order_value) \
         VALUES ($1, 'percentage', $2, $3) ON CONFLICT (code) DO NOTHING",
    )
    .bind("BEMVINDO10")
    .bind(Decimal::TEN)
    .bind(Decimal::new(10_000, 2))
    .execute(pool)
    .await?;
    summary.coupons += inserted.rows_affected();
    info!(inserted = summary.coupons, "Coupons seeded");

    Ok(summary)
}

async fn category_id(pool: &PgPool, slug: &str) -> Result<Option<CategoryId>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

/// URL slug for a product name: lowercase ASCII words joined by `-`.
fn slugify(name: &str) -> String {
    let ascii: String = name
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'Á' | 'À' | 'Â' | 'Ã' => 'a',
            'é' | 'ê' | 'É' | 'Ê' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'ô' | 'õ' | 'Ó' | 'Ô' | 'Õ' => 'o',
            'ú' | 'ü' | 'Ú' | 'Ü' => 'u',
            'ç' | 'Ç' => 'c',
            c if c.is_ascii_alphanumeric() => c.to_ascii_lowercase(),
            _ => ' ',
        })
        .collect();

    ascii.split_whitespace().collect::<Vec<_>>().join("-")
}
