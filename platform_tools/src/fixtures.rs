//! Static fixture catalog.
//!
//! Every synthesized order draws its customer, address, products, carrier and payment method from these tables, so
//! that names, emails and phone numbers stay consistent throughout a payload.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Customer {
    pub id: u64,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub dni: &'static str,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// A marketplace-style handle, e.g. `LAURA.GOMEZ`.
    pub fn nickname(&self) -> String {
        format!("{}.{}", self.first_name, self.last_name).to_uppercase().replace(' ', "")
    }

    /// The phone number without its country code prefix.
    pub fn local_phone(&self) -> &'static str {
        self.phone.strip_prefix("+57").unwrap_or(self.phone)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Address {
    pub street: &'static str,
    pub street2: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub state_code: &'static str,
    pub country: &'static str,
    pub country_code: &'static str,
    pub postal_code: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Product {
    pub id: u64,
    pub sku: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    /// Unit price in pesos.
    pub price: f64,
    /// Weight in kilograms.
    pub weight: f64,
    pub image_url: &'static str,
    pub product_url: &'static str,
}

impl Product {
    pub fn grams(&self) -> i64 {
        #[allow(clippy::cast_possible_truncation)]
        let grams = (self.weight * 1000.0).round() as i64;
        grams
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carrier {
    pub name: &'static str,
    pub code: &'static str,
    pub tracking_url: &'static str,
}

impl Carrier {
    pub fn tracking_url_for(&self, tracking_number: &str) -> String {
        format!("{}{tracking_number}", self.tracking_url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentMethod {
    pub id: u32,
    pub code: &'static str,
    pub name: &'static str,
    pub gateway: &'static str,
    /// Channel-specific spellings of this method.
    pub aliases: &'static [&'static str],
}

pub const CURRENCY: &str = "COP";
pub const WAREHOUSE_NAME: &str = "Bodega Principal Bogotá";

pub static CUSTOMERS: &[Customer] = &[
    Customer {
        id: 184_300_211,
        first_name: "Laura",
        last_name: "Gómez",
        email: "laura.gomez@example.com",
        phone: "+573001234567",
        dni: "1020304050",
    },
    Customer {
        id: 184_300_487,
        first_name: "Andrés",
        last_name: "Ramírez",
        email: "andres.ramirez@example.com",
        phone: "+573112223344",
        dni: "79845123",
    },
    Customer {
        id: 184_301_032,
        first_name: "Camila",
        last_name: "Rodríguez",
        email: "camila.rodriguez@example.com",
        phone: "+573209876543",
        dni: "1032456789",
    },
    Customer {
        id: 184_301_559,
        first_name: "Santiago",
        last_name: "Martínez",
        email: "santiago.martinez@example.com",
        phone: "+573015556677",
        dni: "1017223344",
    },
    Customer {
        id: 184_302_004,
        first_name: "Valentina",
        last_name: "López",
        email: "valentina.lopez@example.com",
        phone: "+573154448899",
        dni: "1144098765",
    },
    Customer {
        id: 184_302_318,
        first_name: "Julián",
        last_name: "Hernández",
        email: "julian.hernandez@example.com",
        phone: "+573186661122",
        dni: "80123456",
    },
];

pub static ADDRESSES: &[Address] = &[
    Address {
        street: "Calle 93 # 11-27",
        street2: "Apto 502",
        city: "Bogotá",
        state: "Cundinamarca",
        state_code: "CUN",
        country: "Colombia",
        country_code: "CO",
        postal_code: "110221",
        latitude: 4.676_84,
        longitude: -74.048_29,
    },
    Address {
        street: "Carrera 43A # 1 Sur-100",
        street2: "Oficina 1204",
        city: "Medellín",
        state: "Antioquia",
        state_code: "ANT",
        country: "Colombia",
        country_code: "CO",
        postal_code: "050021",
        latitude: 6.199_42,
        longitude: -75.574_31,
    },
    Address {
        street: "Avenida 6N # 28N-10",
        street2: "",
        city: "Cali",
        state: "Valle del Cauca",
        state_code: "VAC",
        country: "Colombia",
        country_code: "CO",
        postal_code: "760046",
        latitude: 3.466_91,
        longitude: -76.529_53,
    },
    Address {
        street: "Calle 84 # 51B-210",
        street2: "Casa 3",
        city: "Barranquilla",
        state: "Atlántico",
        state_code: "ATL",
        country: "Colombia",
        country_code: "CO",
        postal_code: "080020",
        latitude: 11.006_72,
        longitude: -74.810_86,
    },
    Address {
        street: "Carrera 27 # 36-14",
        street2: "Torre B",
        city: "Bucaramanga",
        state: "Santander",
        state_code: "SAN",
        country: "Colombia",
        country_code: "CO",
        postal_code: "680003",
        latitude: 7.119_35,
        longitude: -73.122_74,
    },
];

pub static PRODUCTS: &[Product] = &[
    Product {
        id: 8_801_001,
        sku: "CAF-ORG-500",
        name: "Café orgánico",
        title: "Café orgánico de origen Huila 500 g",
        price: 38_900.0,
        weight: 0.5,
        image_url: "https://cdn.example.com/products/caf-org-500.jpg",
        product_url: "https://shop.example.com/products/cafe-organico-500",
    },
    Product {
        id: 8_801_002,
        sku: "MOC-WAY-L",
        name: "Mochila wayuu",
        title: "Mochila wayuu tejida a mano talla L",
        price: 189_000.0,
        weight: 0.45,
        image_url: "https://cdn.example.com/products/moc-way-l.jpg",
        product_url: "https://shop.example.com/products/mochila-wayuu-l",
    },
    Product {
        id: 8_801_003,
        sku: "SOM-VUE-57",
        name: "Sombrero vueltiao",
        title: "Sombrero vueltiao 19 vueltas talla 57",
        price: 125_500.0,
        weight: 0.3,
        image_url: "https://cdn.example.com/products/som-vue-57.jpg",
        product_url: "https://shop.example.com/products/sombrero-vueltiao-57",
    },
    Product {
        id: 8_801_004,
        sku: "PAN-CHO-250",
        name: "Chocolate de mesa",
        title: "Chocolate de mesa sin azúcar 250 g",
        price: 12_900.0,
        weight: 0.25,
        image_url: "https://cdn.example.com/products/pan-cho-250.jpg",
        product_url: "https://shop.example.com/products/chocolate-mesa-250",
    },
    Product {
        id: 8_801_005,
        sku: "HAM-SAN-AZ",
        name: "Hamaca sanjacintera",
        title: "Hamaca sanjacintera doble color azul",
        price: 249_900.0,
        weight: 2.1,
        image_url: "https://cdn.example.com/products/ham-san-az.jpg",
        product_url: "https://shop.example.com/products/hamaca-sanjacintera-azul",
    },
    Product {
        id: 8_801_006,
        sku: "CER-RAQ-06",
        name: "Vajilla de Ráquira",
        title: "Vajilla en cerámica de Ráquira 6 puestos",
        price: 164_000.0,
        weight: 4.8,
        image_url: "https://cdn.example.com/products/cer-raq-06.jpg",
        product_url: "https://shop.example.com/products/vajilla-raquira-6",
    },
    Product {
        id: 8_801_007,
        sku: "RUA-LAN-M",
        name: "Ruana de lana",
        title: "Ruana boyacense en lana virgen talla M",
        price: 98_000.0,
        weight: 0.9,
        image_url: "https://cdn.example.com/products/rua-lan-m.jpg",
        product_url: "https://shop.example.com/products/ruana-lana-m",
    },
];

pub static CARRIERS: &[Carrier] = &[
    Carrier {
        name: "Servientrega",
        code: "servientrega",
        tracking_url: "https://www.servientrega.com/rastreo/guia/",
    },
    Carrier {
        name: "Coordinadora",
        code: "coordinadora",
        tracking_url: "https://www.coordinadora.com/rastreo/guia/",
    },
    Carrier {
        name: "Interrapidísimo",
        code: "interrapidisimo",
        tracking_url: "https://www.interrapidisimo.com/rastreo/",
    },
    Carrier {
        name: "Envía",
        code: "envia",
        tracking_url: "https://envia.co/rastreo/",
    },
    Carrier {
        name: "TCC",
        code: "tcc",
        tracking_url: "https://tcc.com.co/rastreo/",
    },
];

pub static PAYMENT_METHODS: &[PaymentMethod] = &[
    PaymentMethod {
        id: 1,
        code: "credit_card",
        name: "Tarjeta de crédito",
        gateway: "wompi",
        aliases: &["visa", "master", "amex", "stripe", "card"],
    },
    PaymentMethod {
        id: 2,
        code: "debit_card",
        name: "Tarjeta débito",
        gateway: "wompi",
        aliases: &["debvisa", "debmaster"],
    },
    PaymentMethod { id: 3, code: "pse", name: "PSE", gateway: "payu", aliases: &["bank_transfer", "bacs"] },
    PaymentMethod { id: 4, code: "nequi", name: "Nequi", gateway: "nequi", aliases: &[] },
    PaymentMethod {
        id: 5,
        code: "cash_on_delivery",
        name: "Contra entrega",
        gateway: "manual",
        aliases: &["cod", "cash"],
    },
    PaymentMethod {
        id: 6,
        code: "account_money",
        name: "Dinero en cuenta",
        gateway: "mercadopago",
        aliases: &["mercadopago", "wallet"],
    },
];

/// The method reported when a channel names one the catalog does not know.
pub const DEFAULT_PAYMENT_METHOD_ID: u32 = 1;

/// Looks a payment method up by its code or one of its channel aliases, ignoring case.
pub fn find_payment_method(code: &str) -> Option<&'static PaymentMethod> {
    let code = code.trim().to_lowercase();
    PAYMENT_METHODS.iter().find(|m| m.code == code || m.aliases.iter().any(|a| *a == code))
}

/// The catalog id of the method named `code`, or [`DEFAULT_PAYMENT_METHOD_ID`].
pub fn payment_method_id(code: &str) -> u32 {
    find_payment_method(code).map(|m| m.id).unwrap_or(DEFAULT_PAYMENT_METHOD_ID)
}

pub fn find_product_by_sku(sku: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.sku == sku)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn payment_method_lookup() {
        assert_eq!(payment_method_id("pse"), 3);
        assert_eq!(payment_method_id("BACS"), 3);
        assert_eq!(payment_method_id("cod"), 5);
        assert_eq!(payment_method_id("account_money"), 6);
        assert_eq!(payment_method_id("bitcoin"), DEFAULT_PAYMENT_METHOD_ID);
    }

    #[test]
    fn catalog_is_consistent() {
        assert!(!CUSTOMERS.is_empty());
        assert!(!ADDRESSES.is_empty());
        assert!(PRODUCTS.len() >= 3);
        assert!(PRODUCTS.iter().all(|p| p.price > 0.0 && p.weight > 0.0));
        assert!(CUSTOMERS.iter().all(|c| c.phone.starts_with("+57")));
        assert_eq!(find_product_by_sku("RUA-LAN-M").map(|p| p.grams()), Some(900));
        assert_eq!(CUSTOMERS[0].nickname(), "LAURA.GÓMEZ");
        assert_eq!(CUSTOMERS[0].local_phone(), "3001234567");
    }
}
