/*!

This is the long-form manual for `crisis_flows` and `yemenviz`.

## Charts

Two charts are supported:
* `alluvial` the flow of disasters through the classification hierarchy
* `boxplot` the distribution of market prices per commodity

### `alluvial`

Each record of the natural disasters dataset follows a path through the
classification: disaster group, subgroup, type, subtype and finally the name of
the event. Records that share the same path are drawn as a single flow whose
width is the number of records.

Some rules to keep in mind when reading the chart:
- a missing subgroup or subtype is displayed as `Unknown`
- a missing event name is displayed as `Unnamed event`
- records with a missing (or `Unknown`) group or type are not displayed at all.
  Their number is reported in the summary as `excludedCount`.
- the same name at two different levels gives two different nodes
- an event node carries the number of records with this name in the selected
  years. It may differ from the width of a flow entering it, when the same name
  is used under two subtypes.

The levels can be reduced with the `levels` rule, for example
`["group", "type", "event"]`. The levels must follow the order of the
hierarchy.

Only the records whose `Start Year` falls in the selected range are used.
When no record is left, the chart shows a message instead of an empty drawing.

### `boxplot`

Reads the market prices dataset. Rows without a commodity or without a
positive price are ignored. The `commodityFilter` rule restricts the chart to
one category:

| filter      | commodities                                                        |
|-------------|--------------------------------------------------------------------|
| `all`       | everything (default)                                               |
| `fuel`      | names containing diesel, petrol, benzina, kerosene, fuel or gas    |
| `essential` | flour, eggs, rice, beans, bread, sugar, salt, oil, milk, butter    |
| `other`     | the rest                                                           |

The Italian names of the essential commodities (farina, uova, riso, ...) are
also recognized.

## Input formats

* `csv` Comma Separated Values, with a header row
* `xlsx` Excel spreadsheet. The first worksheet is used unless
  `excelWorksheetName` is given.

The column names default to the ones of the public datasets and can be
changed in the configuration file:

| field          | default column      |
|----------------|---------------------|
| `yearColumn`   | `Start Year`        |
| `groupColumn`  | `Disaster Group`    |
| `subgroupColumn` | `Disaster Subgroup` |
| `typeColumn`   | `Disaster Type`     |
| `subtypeColumn` | `Disaster Subtype` |
| `eventColumn`  | `Event Name`        |
| `commodityColumn` | `Commodity`      |
| `regionColumn` | `Admin 1`           |
| `priceColumn`  | `Price`             |
| `dateColumn`   | `Price Date`        |

## Configuration

```json
{
  "outputSettings": {
    "chartName": "Disasters 2010 - 2015",
    "chart": "alluvial",
    "outputPath": "summary.json"
  },
  "dataSources": [
    {
      "provider": "csv",
      "filePath": "disasters.csv"
    }
  ],
  "rules": {
    "levels": ["group", "subgroup", "type", "subtype", "event"],
    "yearStart": 2010,
    "yearEnd": "2015"
  }
}
```

The paths are relative to the configuration file. The years can be written
as numbers or as strings.
*/
